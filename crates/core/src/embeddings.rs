use crate::error::EmbeddingError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use url::Url;

const DEFAULT: usize = 768;

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = DEFAULT;
pub const DEFAULT_GEMINI_MODEL: &str = "models/embedding-001";
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Text embedding provider.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn dimensions(&self) -> usize;
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Offline provider hashing character trigrams into a normalised vector.
#[derive(Debug, Clone, Copy)]
pub struct CharacterNgramEmbedder {
    pub dimensions: usize,
}

impl Default for CharacterNgramEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

impl CharacterNgramEmbedder {
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions.max(1)];
        let lowered = text.to_lowercase();
        let chars: Vec<char> = lowered.chars().collect();

        if chars.is_empty() {
            return vector;
        }

        for window in chars.windows(3) {
            let mut hash = 1469598103934665603u64;
            for ch in window {
                let mut buf = [0u8; 4];
                for byte in ch.encode_utf8(&mut buf).bytes() {
                    hash ^= byte as u64;
                    hash = hash.wrapping_mul(1099511628211);
                }
            }
            let bucket = (hash % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        vector
    }
}

#[async_trait]
impl Embedder for CharacterNgramEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions.max(1)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.embed_sync(text))
    }
}

/// Google Generative Language `embedContent` client.
pub struct GeminiEmbedder {
    api_key: String,
    endpoint: String,
    model: String,
    dimensions: usize,
    client: Client,
}

impl GeminiEmbedder {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            model: model.into(),
            dimensions,
            client: Client::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    fn request_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("{}/{}:embedContent", self.endpoint, self.model))
    }
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: Option<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    #[serde(default)]
    values: Vec<f32>,
}

fn values_from_response(payload: EmbedContentResponse) -> Result<Vec<f32>, EmbeddingError> {
    let values = payload
        .embedding
        .map(|embedding| embedding.values)
        .unwrap_or_default();

    if values.is_empty() {
        return Err(EmbeddingError::EmptyVector);
    }
    Ok(values)
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let response = self
            .client
            .post(self.request_url()?)
            .header("x-goog-api-key", &self.api_key)
            .json(&json!({
                "model": self.model,
                "content": { "parts": [{ "text": text }] },
                "taskType": "RETRIEVAL_DOCUMENT",
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let details = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(EmbeddingError::Provider {
                status: status.as_u16(),
                details,
            });
        }

        values_from_response(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedder_is_deterministic() {
        let embedder = CharacterNgramEmbedder::default();
        let first = embedder.embed_sync("Confidential Information shall not be disclosed");
        let second = embedder.embed_sync("Confidential Information shall not be disclosed");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn embedder_outputs_expected_length() {
        let embedder = CharacterNgramEmbedder { dimensions: 32 };
        let vector = embedder.embed("abc").await.expect("local embedding");
        assert_eq!(vector.len(), 32);
        assert_eq!(embedder.dimensions(), 32);
    }

    #[test]
    fn gemini_url_includes_model_method() {
        let embedder = GeminiEmbedder::new("key", DEFAULT_GEMINI_MODEL, 768)
            .with_endpoint("http://localhost:8080/v1beta/");
        let url = embedder.request_url().expect("valid url");
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/v1beta/models/embedding-001:embedContent"
        );
    }

    #[test]
    fn gemini_response_values_are_extracted() {
        let payload: EmbedContentResponse =
            serde_json::from_str(r#"{"embedding":{"values":[0.25,-0.5,1.0]}}"#)
                .expect("valid payload");
        let values = values_from_response(payload).expect("values present");
        assert_eq!(values, vec![0.25, -0.5, 1.0]);
    }

    #[test]
    fn gemini_response_without_values_is_an_error() {
        let payload: EmbedContentResponse =
            serde_json::from_str(r#"{"embedding":{}}"#).expect("valid payload");
        assert!(matches!(
            values_from_response(payload),
            Err(EmbeddingError::EmptyVector)
        ));
    }
}
