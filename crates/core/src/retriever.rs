use crate::builder::{CHUNKS_FILE, INDEX_FILE};
use crate::embeddings::Embedder;
use crate::error::{EmbeddingError, QueryError};
use crate::index::FlatIndex;
use crate::models::StoredChunk;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

pub const DEFAULT_TOP_K: usize = 5;

const NOT_LOADED_MESSAGE: &str =
    "Error: search index not loaded. Please run the index build first.";
const NO_RESULTS_MESSAGE: &str = "No relevant documents found.";

/// Owns the loaded index and chunk store for the lifetime of the serving
/// process. Loading happens once, up front; a missing or unreadable artifact
/// puts the retriever into an explicit degraded state instead of failing
/// construction.
///
/// Retrieval output feeds directly into a user-visible chat turn, so every
/// failure past construction is converted into a renderable line rather than
/// an error.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    loaded: Option<LoadedIndex>,
}

struct LoadedIndex {
    index: FlatIndex,
    chunks: Vec<String>,
}

impl Retriever {
    /// Reads both artifacts from `dir`. Degrades (with a warning) rather
    /// than erroring when they are missing or corrupt.
    pub fn load(dir: &Path, embedder: Arc<dyn Embedder>) -> Self {
        let loaded = match read_artifacts(dir) {
            Ok(loaded) => Some(loaded),
            Err(reason) => {
                warn!(dir = %dir.display(), %reason, "retriever starting degraded");
                None
            }
        };
        Self { embedder, loaded }
    }

    pub fn is_ready(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn chunk_count(&self) -> usize {
        self.loaded
            .as_ref()
            .map(|loaded| loaded.chunks.len())
            .unwrap_or(0)
    }

    /// Returns up to `top_k` chunk texts, closest first. Always returns at
    /// least one line; never errors.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Vec<String> {
        match self.try_retrieve(query, top_k).await {
            Ok(results) => results,
            Err(QueryError::NotReady(_)) => vec![NOT_LOADED_MESSAGE.to_string()],
            Err(error) => vec![format!("Error retrieving documents: {error}")],
        }
    }

    async fn try_retrieve(&self, query: &str, top_k: usize) -> Result<Vec<String>, QueryError> {
        let loaded = self
            .loaded
            .as_ref()
            .ok_or_else(|| QueryError::NotReady("artifacts not loaded".to_string()))?;

        let mut vectors = self.embedder.embed(&[query.to_string()]).await?;
        if vectors.is_empty() {
            return Err(QueryError::Embedding(EmbeddingError::Batch {
                batch: 1,
                details: "response carried no vector".to_string(),
            }));
        }
        let query_vector = vectors.swap_remove(0);

        let hits = loaded.index.search(&query_vector, top_k)?;

        // Drop any row outside the chunk store; a desynchronized pair must
        // not panic a live query.
        let results: Vec<String> = hits
            .into_iter()
            .filter_map(|(row, _distance)| loaded.chunks.get(row).cloned())
            .collect();

        Ok(if results.is_empty() {
            vec![NO_RESULTS_MESSAGE.to_string()]
        } else {
            results
        })
    }
}

fn read_artifacts(dir: &Path) -> Result<LoadedIndex, String> {
    let index_path = dir.join(INDEX_FILE);
    let chunks_path = dir.join(CHUNKS_FILE);

    if !index_path.is_file() || !chunks_path.is_file() {
        return Err(format!(
            "index artifacts not found in {} (expected {INDEX_FILE} and {CHUNKS_FILE})",
            dir.display()
        ));
    }

    let index = FlatIndex::read_from(&index_path).map_err(|error| error.to_string())?;

    let raw = fs::read_to_string(&chunks_path).map_err(|error| error.to_string())?;
    let mut chunks = Vec::new();
    for (number, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let stored: StoredChunk = serde_json::from_str(line)
            .map_err(|error| format!("chunk store line {}: {error}", number + 1))?;
        chunks.push(stored.text);
    }

    Ok(LoadedIndex { index, chunks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_index;
    use crate::embeddings::HashedNgramEmbedder;
    use async_trait::async_trait;
    use tempfile::tempdir;

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Err(EmbeddingError::Config("service unavailable".to_string()))
        }
    }

    fn stub() -> Arc<HashedNgramEmbedder> {
        Arc::new(HashedNgramEmbedder { dimensions: 64 })
    }

    fn build_sample(dir: &Path) -> Vec<String> {
        let chunks = vec![
            "Savings\nA savings account earns interest.".to_string(),
            "EMI\nEMI is a fixed monthly loan repayment.".to_string(),
        ];
        let embedder = stub();
        let embeddings: Vec<_> = chunks.iter().map(|c| embedder.embed_one(c)).collect();
        build_index(&chunks, &embeddings, dir).unwrap();
        chunks
    }

    #[tokio::test]
    async fn missing_artifacts_degrade_to_a_placeholder() {
        let dir = tempdir().unwrap();
        let retriever = Retriever::load(dir.path(), stub());

        assert!(!retriever.is_ready());
        let results = retriever.retrieve("How do I open an account?", 5).await;
        assert_eq!(results, vec![NOT_LOADED_MESSAGE.to_string()]);
    }

    #[tokio::test]
    async fn a_chunk_retrieves_itself_top_one() {
        let dir = tempdir().unwrap();
        let chunks = build_sample(dir.path());
        let retriever = Retriever::load(dir.path(), stub());

        assert!(retriever.is_ready());
        assert_eq!(retriever.chunk_count(), 2);

        for chunk in &chunks {
            let results = retriever.retrieve(chunk, 1).await;
            assert_eq!(&results[0], chunk);
        }
    }

    #[tokio::test]
    async fn savings_query_ranks_savings_above_emi() {
        let dir = tempdir().unwrap();
        build_sample(dir.path());
        let retriever = Retriever::load(dir.path(), stub());

        let results = retriever
            .retrieve("How does a savings account work?", 1)
            .await;
        assert_eq!(results.len(), 1);
        assert!(results[0].contains("savings account earns interest"));
    }

    #[tokio::test]
    async fn embedding_failure_becomes_a_readable_line() {
        let dir = tempdir().unwrap();
        build_sample(dir.path());
        let retriever = Retriever::load(dir.path(), Arc::new(FailingEmbedder));

        let results = retriever.retrieve("anything", 5).await;
        assert_eq!(results.len(), 1);
        assert!(results[0].starts_with("Error retrieving documents:"));
    }

    #[tokio::test]
    async fn out_of_bounds_rows_are_dropped() {
        // Simulate a desynchronized pair: three index rows, two stored
        // chunks.
        let dir = tempdir().unwrap();
        let embedder = stub();
        let texts = ["savings account", "loan emi", "kyc rules"];
        let mut index = FlatIndex::new(64);
        for text in &texts {
            index.add_row(&embedder.embed_one(text)).unwrap();
        }
        index.write_to(&dir.path().join(INDEX_FILE)).unwrap();
        std::fs::write(
            dir.path().join(CHUNKS_FILE),
            "{\"text\":\"savings account\"}\n{\"text\":\"loan emi\"}\n",
        )
        .unwrap();

        let retriever = Retriever::load(dir.path(), embedder);
        let results = retriever.retrieve("kyc rules", 3).await;

        // Row 2 has no chunk text and must be dropped, not panic.
        assert!(results.len() <= 2);
        assert!(results.iter().all(|text| text != "kyc rules"));
    }

    #[tokio::test]
    async fn corrupt_index_degrades_instead_of_failing() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(INDEX_FILE), b"garbage").unwrap();
        std::fs::write(dir.path().join(CHUNKS_FILE), "{\"text\":\"x\"}\n").unwrap();

        let retriever = Retriever::load(dir.path(), stub());
        assert!(!retriever.is_ready());
    }
}
