use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One source record from the line-delimited corpus. Extra JSON fields
/// (source, url, ...) carried by scraped records are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BankingDocument {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl BankingDocument {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Text actually indexed for this document.
    pub fn full_text(&self) -> String {
        format!("{}\n{}", self.title, self.content)
    }
}

/// One line of the persisted chunk store. Line `i` must correspond to row
/// `i` of the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    pub text: String,
}

#[derive(Debug, Clone, Copy)]
pub struct IndexingOptions {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub embed_batch_size: usize,
}

impl Default for IndexingOptions {
    fn default() -> Self {
        Self {
            chunk_size: 300,
            chunk_overlap: 50,
            embed_batch_size: 10,
        }
    }
}

/// Report returned by a successful index build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSummary {
    pub chunk_count: usize,
    pub dimension: usize,
    pub built_at: DateTime<Utc>,
}

/// Response style forwarded to the completion model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStyle {
    Concise,
    Detailed,
}

impl ResponseStyle {
    pub fn system_prompt(self) -> &'static str {
        match self {
            ResponseStyle::Concise => {
                "You are a helpful AI assistant specializing in Indian banking, finance, and \
                 regulations. Respond concisely and clearly."
            }
            ResponseStyle::Detailed => {
                "You are a helpful AI assistant specializing in Indian banking, finance, and \
                 regulations. Provide detailed and comprehensive answers including examples and \
                 context where appropriate."
            }
        }
    }
}

impl std::str::FromStr for ResponseStyle {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "concise" => Ok(ResponseStyle::Concise),
            "detailed" => Ok(ResponseStyle::Detailed),
            other => Err(format!("unknown response style: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_tolerates_extra_fields() {
        let line = r#"{"title":"RBI Notification","content":"KYC update","source":"RBI","url":"x"}"#;
        let doc: BankingDocument = serde_json::from_str(line).expect("should deserialize");
        assert_eq!(doc.title, "RBI Notification");
        assert_eq!(doc.content, "KYC update");
    }

    #[test]
    fn full_text_joins_title_and_content() {
        let doc = BankingDocument::new("Savings", "A savings account earns interest.");
        assert_eq!(doc.full_text(), "Savings\nA savings account earns interest.");
    }

    #[test]
    fn response_style_parses_case_insensitively() {
        assert_eq!(
            "Concise".parse::<ResponseStyle>().unwrap(),
            ResponseStyle::Concise
        );
        assert!("verbose".parse::<ResponseStyle>().is_err());
    }
}
