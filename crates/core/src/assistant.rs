use crate::cache::{query_cache_key, ResponseCache};
use crate::completion::CompletionClient;
use crate::dispatch::{classify_query, WebAugmentor};
use crate::models::ResponseStyle;
use crate::prompt::{build_prompt, format_web_section};
use crate::retriever::{Retriever, DEFAULT_TOP_K};
use tokio::sync::Mutex;
use tracing::info;

pub const DEFAULT_CACHE_SIZE: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    pub text: String,
    pub from_cache: bool,
}

/// One user query handled end to end: cache lookup, retrieval, optional
/// web augmentation, prompt assembly, completion, cache store.
///
/// Every failure path below the cache yields a renderable string; nothing
/// here terminates the hosting process. The cache is the only mutable state
/// touched per query and is serialized behind a mutex.
pub struct Assistant<C, W>
where
    C: CompletionClient,
    W: WebAugmentor,
{
    retriever: Retriever,
    completion: C,
    augmentor: Option<W>,
    cache: Mutex<ResponseCache>,
    top_k: usize,
}

impl<C, W> Assistant<C, W>
where
    C: CompletionClient,
    W: WebAugmentor,
{
    pub fn new(retriever: Retriever, completion: C, augmentor: Option<W>) -> Self {
        Self {
            retriever,
            completion,
            augmentor,
            cache: Mutex::new(ResponseCache::new(DEFAULT_CACHE_SIZE)),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_cache_size(mut self, max_size: usize) -> Self {
        self.cache = Mutex::new(ResponseCache::new(max_size));
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub async fn answer(&self, query: &str, style: ResponseStyle) -> AssistantReply {
        let key = query_cache_key(query);

        if let Some(cached) = self.cache.lock().await.get(&key) {
            info!("answer served from cache");
            return AssistantReply {
                text: cached.clone(),
                from_cache: true,
            };
        }

        let context_chunks = self.retriever.retrieve(query, self.top_k).await;

        let web_context = match &self.augmentor {
            Some(augmentor) => {
                let route = classify_query(query);
                augmentor
                    .augment(query, route)
                    .await
                    .map(|text| format_web_section(route.section_heading(), &text))
            }
            None => None,
        };

        let prompt = build_prompt(query, &context_chunks, web_context.as_deref());
        let text = self.completion.complete(&prompt, style).await;

        self.cache.lock().await.set(key, text.clone());

        AssistantReply {
            text,
            from_cache: false,
        }
    }
}
