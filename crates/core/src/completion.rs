use crate::config::ChatConfig;
use crate::models::ResponseStyle;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

const TEMPERATURE: f64 = 0.3;
const MAX_TOKENS: u32 = 1024;

/// Boundary to the hosted completion model. Implementations never raise
/// past this boundary: any failure is returned as a human-readable error
/// string suitable for rendering in a chat turn.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str, style: ResponseStyle) -> String;
}

/// Azure OpenAI chat-completions client.
pub struct AzureChatClient {
    config: ChatConfig,
    client: Client,
}

impl AzureChatClient {
    pub fn new(config: ChatConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    async fn request(&self, prompt: &str, style: ResponseStyle) -> Result<String, String> {
        let response = self
            .client
            .post(self.config.endpoint.clone())
            .header("api-key", &self.config.api_key)
            .json(&json!({
                "model": self.config.deployment,
                "messages": [
                    {"role": "system", "content": style.system_prompt()},
                    {"role": "user", "content": prompt},
                ],
                "temperature": TEMPERATURE,
                "max_tokens": MAX_TOKENS,
            }))
            .send()
            .await
            .map_err(|error| error.to_string())?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("status {status}: {body}"));
        }

        let parsed: ChatResponse = response.json().await.map_err(|error| error.to_string())?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| "completion response carried no choices".to_string())
    }
}

#[async_trait]
impl CompletionClient for AzureChatClient {
    async fn complete(&self, prompt: &str, style: ResponseStyle) -> String {
        match self.request(prompt, style).await {
            Ok(answer) => answer,
            Err(details) => {
                error!(%details, "completion request failed");
                format!("Error from LLM: {details}")
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_response_parses_first_choice() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"  An answer.  "}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.trim(),
            "An answer."
        );
    }
}
