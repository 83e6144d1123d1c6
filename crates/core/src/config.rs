use crate::error::EmbeddingError;
use std::env;
use url::Url;

const EMBEDDING_ENDPOINT_VAR: &str = "AZURE_EMBEDDING_ENDPOINT";
const EMBEDDING_API_KEY_VAR: &str = "AZURE_EMBEDDING_API_KEY";
const EMBEDDING_DEPLOYMENT_VAR: &str = "AZURE_EMBEDDING";

const CHAT_ENDPOINT_VAR: &str = "AZURE_CHAT_COMPLETION_ENDPOINT";
const CHAT_API_KEY_VAR: &str = "AZURE_CHAT_COMPLETION_API_KEY";
const CHAT_DEPLOYMENT_VAR: &str = "AZURE_CHAT_COMPLETION_DEPLOYMENT_GPT";

/// Settings for the Azure OpenAI embedding deployment. The endpoint is the
/// full deployment URL including the api-version query string.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub endpoint: Url,
    pub api_key: String,
    pub deployment: String,
}

/// Settings for the Azure OpenAI chat-completions deployment.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub endpoint: Url,
    pub api_key: String,
    pub deployment: String,
}

impl EmbeddingConfig {
    /// Reads the embedding settings from the environment, reporting every
    /// missing variable in one message. No network call is made here or
    /// anywhere before this validation passes.
    pub fn from_env() -> Result<Self, EmbeddingError> {
        let (endpoint, api_key, deployment) = read_trio(
            EMBEDDING_ENDPOINT_VAR,
            EMBEDDING_API_KEY_VAR,
            EMBEDDING_DEPLOYMENT_VAR,
        )?;
        Ok(Self {
            endpoint,
            api_key,
            deployment,
        })
    }

    pub fn new(
        endpoint: &str,
        api_key: impl Into<String>,
        deployment: impl Into<String>,
    ) -> Result<Self, EmbeddingError> {
        Ok(Self {
            endpoint: parse_endpoint(endpoint)?,
            api_key: api_key.into(),
            deployment: deployment.into(),
        })
    }
}

impl ChatConfig {
    pub fn from_env() -> Result<Self, EmbeddingError> {
        let (endpoint, api_key, deployment) =
            read_trio(CHAT_ENDPOINT_VAR, CHAT_API_KEY_VAR, CHAT_DEPLOYMENT_VAR)?;
        Ok(Self {
            endpoint,
            api_key,
            deployment,
        })
    }

    pub fn new(
        endpoint: &str,
        api_key: impl Into<String>,
        deployment: impl Into<String>,
    ) -> Result<Self, EmbeddingError> {
        Ok(Self {
            endpoint: parse_endpoint(endpoint)?,
            api_key: api_key.into(),
            deployment: deployment.into(),
        })
    }
}

fn read_trio(
    endpoint_var: &str,
    key_var: &str,
    deployment_var: &str,
) -> Result<(Url, String, String), EmbeddingError> {
    let mut missing = Vec::new();
    let endpoint = read_var(endpoint_var, &mut missing);
    let api_key = read_var(key_var, &mut missing);
    let deployment = read_var(deployment_var, &mut missing);

    if !missing.is_empty() {
        return Err(EmbeddingError::Config(format!(
            "the following environment variables are not set: {}. \
             Please check your environment before building or querying the index.",
            missing.join(", ")
        )));
    }

    let endpoint = parse_endpoint(&endpoint.unwrap_or_default())?;
    Ok((
        endpoint,
        api_key.unwrap_or_default(),
        deployment.unwrap_or_default(),
    ))
}

fn read_var(name: &str, missing: &mut Vec<String>) -> Option<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => {
            missing.push(name.to_string());
            None
        }
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, EmbeddingError> {
    Url::parse(raw).map_err(|error| {
        EmbeddingError::Config(format!("endpoint {raw:?} is not a valid url: {error}"))
    })
}
