use anyhow::Context;
use banking_rag_core::{
    build_from_documents, load_documents, merge_documents, Assistant, AzureChatClient,
    AzureEmbeddingClient, BankingDocument, ChatConfig, EmbeddingConfig, IndexingOptions,
    NoWebSearch, ResponseStyle, Retriever,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "banking-rag", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding the persisted index artifacts.
    #[arg(long, env = "BANKING_RAG_INDEX_DIR", default_value = "index")]
    index_dir: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Chunk and embed the corpus, then build the index artifacts.
    Build {
        /// Corpus file, or a directory whose .jsonl files are merged.
        #[arg(long, default_value = "data/banking_documents.jsonl")]
        corpus: PathBuf,

        /// Maximum characters per chunk.
        #[arg(long, default_value = "300")]
        chunk_size: usize,

        /// Characters of overlap between adjacent chunks.
        #[arg(long, default_value = "50")]
        chunk_overlap: usize,

        /// Chunks embedded per request to the embedding API.
        #[arg(long, default_value = "10")]
        embed_batch_size: usize,
    },
    /// Answer a single question against the built index.
    Ask {
        /// The banking question.
        #[arg(long)]
        query: String,

        /// Response style: concise or detailed.
        #[arg(long, default_value = "detailed")]
        style: ResponseStyle,

        /// Number of knowledge-base chunks to retrieve.
        #[arg(long, default_value = "5")]
        top_k: usize,
    },
    /// Interactive question loop over stdin.
    Chat {
        /// Response style: concise or detailed.
        #[arg(long, default_value = "detailed")]
        style: ResponseStyle,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        started_at = %Utc::now().to_rfc3339(),
        "banking-rag boot"
    );

    match cli.command {
        Command::Build {
            corpus,
            chunk_size,
            chunk_overlap,
            embed_batch_size,
        } => {
            let documents = load_corpus(&corpus)?;
            if documents.is_empty() {
                anyhow::bail!("no valid documents found in {}", corpus.display());
            }
            info!(documents = documents.len(), "corpus loaded");

            let options = IndexingOptions {
                chunk_size,
                chunk_overlap,
                embed_batch_size,
            };

            let config = EmbeddingConfig::from_env()
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;
            let embedder =
                AzureEmbeddingClient::new(config).with_batch_size(options.embed_batch_size);

            let summary = build_from_documents(&documents, &options, &embedder, &cli.index_dir)
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            println!(
                "{} chunks indexed ({}-d) into {} at {}",
                summary.chunk_count,
                summary.dimension,
                cli.index_dir.display(),
                summary.built_at.to_rfc3339()
            );
        }
        Command::Ask {
            query,
            style,
            top_k,
        } => {
            let assistant = make_assistant(&cli.index_dir)?.with_top_k(top_k);
            let reply = assistant.answer(&query, style).await;
            if reply.from_cache {
                println!("(cached)");
            }
            println!("{}", reply.text);
        }
        Command::Chat { style } => {
            let assistant = make_assistant(&cli.index_dir)?;
            println!("Ask a banking question (exit to quit):");

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                let query = line.trim();
                if query.is_empty() {
                    continue;
                }
                if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
                    break;
                }

                let reply = assistant.answer(query, style).await;
                if reply.from_cache {
                    println!("(cached)");
                }
                println!("{}\n", reply.text);
            }
        }
    }

    Ok(())
}

fn load_corpus(corpus: &Path) -> anyhow::Result<Vec<BankingDocument>> {
    if corpus.is_dir() {
        let files = banking_rag_core::discover_corpus_files(corpus);
        if files.is_empty() {
            anyhow::bail!("no .jsonl files found under {}", corpus.display());
        }
        let mut merged = Vec::new();
        for file in files {
            match load_documents(&file) {
                Ok(documents) => merged = merge_documents(merged, documents),
                Err(error) => warn!(path = %file.display(), %error, "skipping corpus file"),
            }
        }
        Ok(merged)
    } else {
        load_documents(corpus).with_context(|| format!("loading corpus {}", corpus.display()))
    }
}

fn make_assistant(index_dir: &Path) -> anyhow::Result<Assistant<AzureChatClient, NoWebSearch>> {
    let embedding_config =
        EmbeddingConfig::from_env().map_err(|error| anyhow::anyhow!(error.to_string()))?;
    let chat_config = ChatConfig::from_env().map_err(|error| anyhow::anyhow!(error.to_string()))?;

    let embedder = Arc::new(AzureEmbeddingClient::new(embedding_config));
    let retriever = Retriever::load(index_dir, embedder);
    if !retriever.is_ready() {
        warn!(
            dir = %index_dir.display(),
            "index artifacts missing; answers will not use the knowledge base"
        );
    }

    let completion = AzureChatClient::new(chat_config);
    Ok(Assistant::new(retriever, completion, None::<NoWebSearch>))
}
