use crate::embeddings::Embedder;
use crate::error::{IndexError, Result};
use crate::index::FlatIndex;
use crate::ingest::collect_chunks;
use crate::models::{BankingDocument, BuildSummary, IndexingOptions, StoredChunk};
use chrono::Utc;
use std::fs;
use std::path::Path;
use tracing::info;

pub const INDEX_FILE: &str = "flat.index";
pub const CHUNKS_FILE: &str = "chunks.jsonl";

/// Builds and persists the two co-indexed artifacts: the flat vector index
/// and the chunk store whose line order matches the index row order.
///
/// Validation happens before any write, and both files are staged under
/// temporary names and renamed into place only once both writes succeed, so
/// a failed build never leaves a half-updated index/chunk-store pair.
pub fn build_index(
    chunks: &[String],
    embeddings: &[Vec<f32>],
    dir: &Path,
) -> Result<BuildSummary> {
    if chunks.is_empty() || embeddings.is_empty() {
        return Err(IndexError::InvalidInput(
            "no chunks or embeddings provided for indexing".to_string(),
        ));
    }
    if chunks.len() != embeddings.len() {
        return Err(IndexError::InvalidInput(format!(
            "mismatch: {} chunks vs {} embeddings",
            chunks.len(),
            embeddings.len()
        )));
    }

    let dimension = embeddings[0].len();
    if dimension == 0 {
        return Err(IndexError::InvalidInput(
            "embeddings have zero dimension".to_string(),
        ));
    }

    let mut index = FlatIndex::new(dimension);
    for embedding in embeddings {
        // add_row rejects any row whose dimension differs from the first.
        index.add_row(embedding)?;
    }

    fs::create_dir_all(dir)?;

    let index_path = dir.join(INDEX_FILE);
    let chunks_path = dir.join(CHUNKS_FILE);
    let index_tmp = dir.join(format!("{INDEX_FILE}.tmp"));
    let chunks_tmp = dir.join(format!("{CHUNKS_FILE}.tmp"));

    index.write_to(&index_tmp)?;

    let mut store = String::new();
    for chunk in chunks {
        store.push_str(&serde_json::to_string(&StoredChunk {
            text: chunk.clone(),
        })?);
        store.push('\n');
    }
    fs::write(&chunks_tmp, store)?;

    fs::rename(&index_tmp, &index_path)?;
    fs::rename(&chunks_tmp, &chunks_path)?;

    let summary = BuildSummary {
        chunk_count: chunks.len(),
        dimension,
        built_at: Utc::now(),
    };
    info!(
        chunks = summary.chunk_count,
        dimension = summary.dimension,
        dir = %dir.display(),
        "index build complete"
    );
    Ok(summary)
}

/// The whole offline pipeline: documents -> chunks -> embeddings ->
/// persisted artifacts.
pub async fn build_from_documents(
    documents: &[BankingDocument],
    options: &IndexingOptions,
    embedder: &dyn Embedder,
    dir: &Path,
) -> Result<BuildSummary> {
    let chunks = collect_chunks(documents, options)?;
    if chunks.is_empty() {
        return Err(IndexError::InvalidInput(
            "corpus produced no chunks".to_string(),
        ));
    }

    info!(chunks = chunks.len(), "generating embeddings");
    let embeddings = embedder.embed(&chunks).await?;
    build_index(&chunks, &embeddings, dir)
}
