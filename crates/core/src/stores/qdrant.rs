use crate::models::{SnippetMetadata, StoreMatch};
use crate::store::{check_dimension, metadata_from_value};
use crate::traits::VectorStore;
use crate::StoreError;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

const BACKEND: &str = "qdrant";

pub struct QdrantStore {
    endpoint: String,
    collection: String,
    client: Client,
    vector_size: usize,
}

impl QdrantStore {
    pub fn new(endpoint: impl Into<String>, collection: impl Into<String>, vector_size: usize) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            collection: collection.into(),
            client: Client::new(),
            vector_size,
        }
    }

    /// Creates the cosine collection when it does not exist yet.
    pub async fn ensure_collection(&self) -> Result<(), StoreError> {
        let response = self.client.get(self.collection_url("")).send().await?;

        if response.status() == StatusCode::OK {
            return Ok(());
        }
        if response.status() != StatusCode::NOT_FOUND {
            return Err(backend_error(response.status()));
        }

        let response = self
            .client
            .put(self.collection_url(""))
            .json(&json!({
                "vectors": { "size": self.vector_size, "distance": "Cosine" }
            }))
            .send()
            .await?;
        ensure_success(response)?;
        Ok(())
    }

    fn collection_url(&self, suffix: &str) -> String {
        format!("{}/collections/{}{}", self.endpoint, self.collection, suffix)
    }
}

/// Qdrant only accepts integer or UUID ids; the composite id maps onto a
/// stable UUID so an upsert of the same pair replaces the old point.
pub fn point_id(snippet_id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, snippet_id.as_bytes())
}

fn backend_error(status: StatusCode) -> StoreError {
    StoreError::BackendResponse {
        backend: BACKEND.to_string(),
        details: status.to_string(),
    }
}

fn ensure_success(response: Response) -> Result<Response, StoreError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(backend_error(response.status()))
    }
}

fn upsert_body(id: &str, vector: &[f32], metadata: &SnippetMetadata) -> Value {
    json!({
        "points": [{
            "id": point_id(id).to_string(),
            "vector": vector,
            "payload": {
                "snippet_id": id,
                "contract_id": metadata.contract_id,
                "keyword": metadata.keyword,
                "snippet_text": metadata.snippet_text,
            },
        }]
    })
}

fn matches_from_search(parsed: &Value) -> Result<Vec<StoreMatch>, StoreError> {
    let hits = parsed
        .pointer("/result")
        .and_then(Value::as_array)
        .ok_or_else(|| StoreError::BackendResponse {
            backend: BACKEND.to_string(),
            details: "search response has no result array".to_string(),
        })?;

    hits.iter()
        .map(|hit| {
            let payload = hit.pointer("/payload");
            let id = payload
                .and_then(|payload| payload.get("snippet_id"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| hit.pointer("/id").map(|id| id.to_string()))
                .unwrap_or_default();
            let score = hit.pointer("/score").and_then(Value::as_f64).unwrap_or(0.0);
            let metadata = metadata_from_value(&id, payload)?;
            Ok::<_, StoreError>(StoreMatch { id, score, metadata })
        })
        .collect()
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn upsert(
        &self,
        id: &str,
        vector: &[f32],
        metadata: &SnippetMetadata,
    ) -> Result<(), StoreError> {
        check_dimension(self.vector_size, vector)?;

        let response = self
            .client
            .put(self.collection_url("/points?wait=true"))
            .json(&upsert_body(id, vector, metadata))
            .send()
            .await?;
        ensure_success(response)?;
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<StoreMatch>, StoreError> {
        check_dimension(self.vector_size, vector)?;

        let response = self
            .client
            .post(self.collection_url("/points/search"))
            .json(&json!({
                "vector": vector,
                "limit": top_k,
                "with_payload": true,
            }))
            .send()
            .await?;

        let parsed: Value = ensure_success(response)?.json().await?;
        matches_from_search(&parsed)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let response = self
            .client
            .post(self.collection_url("/points/count"))
            .json(&json!({ "exact": true }))
            .send()
            .await?;

        let parsed: Value = ensure_success(response)?.json().await?;
        parsed
            .pointer("/result/count")
            .and_then(Value::as_u64)
            .map(|count| count as usize)
            .ok_or_else(|| StoreError::BackendResponse {
                backend: BACKEND.to_string(),
                details: "count response has no result.count".to_string(),
            })
    }
}
