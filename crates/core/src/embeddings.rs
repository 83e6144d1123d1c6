use crate::config::EmbeddingConfig;
use crate::error::EmbeddingError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const DEFAULT_BATCH_SIZE: usize = 10;

pub const DEFAULT_STUB_DIMENSIONS: usize = 128;

/// Turns ordered text into ordered fixed-dimension vectors, one per input.
///
/// Corpus chunks and live queries must go through the same implementation
/// (same model, same configuration) or distances between them are
/// meaningless.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Azure OpenAI embedding client. Batches inputs to respect API limits and
/// fails the whole operation on the first failing batch.
pub struct AzureEmbeddingClient {
    config: EmbeddingConfig,
    client: Client,
    batch_size: usize,
}

impl AzureEmbeddingClient {
    pub fn new(config: EmbeddingConfig) -> Self {
        Self {
            config,
            client: Client::new(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Inputs sent per embedding request.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    async fn embed_batch(
        &self,
        batch: &[String],
        batch_number: usize,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let response = self
            .client
            .post(self.config.endpoint.clone())
            .header("api-key", &self.config.api_key)
            .json(&json!({
                "input": batch,
                "model": self.config.deployment,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Batch {
                batch: batch_number,
                details: format!("status {status}: {body}"),
            });
        }

        let parsed: EmbeddingResponse = response.json().await?;
        if parsed.data.len() != batch.len() {
            return Err(EmbeddingError::Batch {
                batch: batch_number,
                details: format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    parsed.data.len()
                ),
            });
        }

        // The API may return rows out of order; the `index` field is the
        // position in the request input.
        let mut rows = parsed.data;
        rows.sort_by_key(|row| row.index);
        Ok(rows.into_iter().map(|row| row.embedding).collect())
    }
}

#[async_trait]
impl Embedder for AzureEmbeddingClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        let total_batches = texts.len().div_ceil(self.batch_size);

        for (batch_number, batch) in texts.chunks(self.batch_size).enumerate() {
            let batch_embeddings = self.embed_batch(batch, batch_number + 1).await?;
            embeddings.extend(batch_embeddings);
            debug!(
                batch = batch_number + 1,
                total = total_batches,
                "embedded batch"
            );
        }

        Ok(embeddings)
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingRow {
    index: usize,
    embedding: Vec<f32>,
}

/// Deterministic character-trigram embedder. Produces normalized
/// fixed-dimension vectors without any network call; used by tests and as an
/// offline stand-in where live embeddings are unavailable.
#[derive(Debug, Clone, Copy)]
pub struct HashedNgramEmbedder {
    pub dimensions: usize,
}

impl Default for HashedNgramEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_STUB_DIMENSIONS,
        }
    }
}

impl HashedNgramEmbedder {
    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions.max(1)];
        let lowered = text.to_lowercase();
        let chars: Vec<char> = lowered.chars().collect();

        if chars.is_empty() {
            return vector;
        }

        for window in chars.windows(3) {
            let token = window.iter().collect::<String>();
            let mut hash = 1469598103934665603u64;
            for byte in token.bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(1099511628211);
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
impl Embedder for HashedNgramEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}
