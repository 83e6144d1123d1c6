pub mod assistant;
pub mod builder;
pub mod cache;
pub mod chunking;
pub mod completion;
pub mod config;
pub mod dispatch;
pub mod embeddings;
pub mod error;
pub mod index;
pub mod ingest;
pub mod models;
pub mod prompt;
pub mod retriever;

pub use assistant::{Assistant, AssistantReply, DEFAULT_CACHE_SIZE};
pub use builder::{build_from_documents, build_index, CHUNKS_FILE, INDEX_FILE};
pub use cache::{query_cache_key, ResponseCache};
pub use chunking::{chunk_text, clean_text};
pub use completion::{AzureChatClient, CompletionClient};
pub use config::{ChatConfig, EmbeddingConfig};
pub use dispatch::{classify_query, NoWebSearch, QueryRoute, WebAugmentor};
pub use embeddings::{AzureEmbeddingClient, Embedder, HashedNgramEmbedder};
pub use error::{EmbeddingError, IndexError, QueryError};
pub use index::FlatIndex;
pub use ingest::{
    collect_chunks, discover_corpus_files, load_documents, merge_documents, save_documents,
};
pub use models::{
    BankingDocument, BuildSummary, IndexingOptions, ResponseStyle, StoredChunk,
};
pub use prompt::{build_prompt, format_web_section};
pub use retriever::{Retriever, DEFAULT_TOP_K};
