use crate::models::{SnippetMetadata, StoreMatch};
use crate::store::{check_dimension, metadata_from_value};
use crate::traits::VectorStore;
use crate::StoreError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use url::Url;

const BACKEND: &str = "pinecone";
const PINECONE_API_VERSION: &str = "2025-01";
/// Largest `topK` the query endpoint accepts.
pub const PINECONE_MAX_TOP_K: usize = 10_000;

/// Pinecone data-plane client for a single index host.
pub struct PineconeStore {
    host: Url,
    api_key: String,
    namespace: Option<String>,
    client: Client,
    vector_size: usize,
}

impl PineconeStore {
    pub fn new(
        host: &str,
        api_key: impl Into<String>,
        namespace: Option<String>,
        vector_size: usize,
    ) -> Result<Self, StoreError> {
        let host = if host.ends_with('/') {
            Url::parse(host)?
        } else {
            Url::parse(&format!("{host}/"))?
        };

        Ok(Self {
            host,
            api_key: api_key.into(),
            namespace: namespace.filter(|name| !name.trim().is_empty()),
            client: Client::new(),
            vector_size,
        })
    }

    fn post(&self, path: &str) -> Result<RequestBuilder, StoreError> {
        Ok(self
            .client
            .post(self.host.join(path)?)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", PINECONE_API_VERSION))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, StoreError> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(StoreError::BackendResponse {
                backend: BACKEND.to_string(),
                details: response.status().to_string(),
            });
        }
        Ok(response.json().await?)
    }
}

fn matches_from_query(parsed: &Value) -> Result<Vec<StoreMatch>, StoreError> {
    let matches = parsed
        .get("matches")
        .and_then(Value::as_array)
        .ok_or_else(|| StoreError::BackendResponse {
            backend: BACKEND.to_string(),
            details: "query response has no matches array".to_string(),
        })?;

    matches
        .iter()
        .map(|entry| {
            let id = entry
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let score = entry.get("score").and_then(Value::as_f64).unwrap_or(0.0);
            let metadata = metadata_from_value(&id, entry.get("metadata"))?;
            Ok::<_, StoreError>(StoreMatch { id, score, metadata })
        })
        .collect()
}

fn vector_count(stats: &Value, namespace: Option<&str>) -> usize {
    let count = match namespace {
        // Namespace names may contain `/`, so look them up as keys.
        Some(name) => stats
            .get("namespaces")
            .and_then(|namespaces| namespaces.get(name))
            .and_then(|entry| entry.get("vectorCount"))
            .and_then(Value::as_u64),
        None => stats.get("totalVectorCount").and_then(Value::as_u64),
    };
    count.unwrap_or(0) as usize
}

fn upsert_body(
    id: &str,
    vector: &[f32],
    metadata: &SnippetMetadata,
    namespace: Option<&str>,
) -> Value {
    let mut body = json!({
        "vectors": [{
            "id": id,
            "values": vector,
            "metadata": metadata,
        }]
    });
    if let Some(namespace) = namespace {
        body["namespace"] = json!(namespace);
    }
    body
}

fn query_body(vector: &[f32], top_k: usize, namespace: Option<&str>) -> Value {
    let mut body = json!({
        "vector": vector,
        "topK": top_k.min(PINECONE_MAX_TOP_K),
        "includeMetadata": true,
        "includeValues": false,
    });
    if let Some(namespace) = namespace {
        body["namespace"] = json!(namespace);
    }
    body
}

#[async_trait]
impl VectorStore for PineconeStore {
    async fn upsert(
        &self,
        id: &str,
        vector: &[f32],
        metadata: &SnippetMetadata,
    ) -> Result<(), StoreError> {
        check_dimension(self.vector_size, vector)?;

        let body = upsert_body(id, vector, metadata, self.namespace.as_deref());
        self.send(self.post("vectors/upsert")?.json(&body)).await?;
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<StoreMatch>, StoreError> {
        check_dimension(self.vector_size, vector)?;

        let body = query_body(vector, top_k, self.namespace.as_deref());
        let parsed = self.send(self.post("query")?.json(&body)).await?;
        matches_from_query(&parsed)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let stats = self
            .send(self.post("describe_index_stats")?.json(&json!({})))
            .await?;
        Ok(vector_count(&stats, self.namespace.as_deref()))
    }
}
