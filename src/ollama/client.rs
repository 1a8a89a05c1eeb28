use std::env;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::types::{ApiError, GenerateRequest, GenerateResponse};

pub const DEFAULT_HOST: &str = "http://127.0.0.1:11434";

#[derive(Debug, thiserror::Error)]
pub enum OllamaError {
    #[error("model request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("model API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("unreadable model response: {0}")]
    Decode(String),
}

/// A single non-streaming "generate text from prompt" operation.
/// Implemented by `OllamaClient`; tests substitute canned responders.
pub trait ModelClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, OllamaError>;
}

#[derive(Clone, Debug)]
pub struct OllamaClient {
    http: Client,
    host: String,
    timeout: Duration,
}

impl OllamaClient {
    /// Reads `OLLAMA_HOST`, falling back to the local daemon.
    pub fn from_env(http: Client, timeout: Duration) -> Self {
        Self::new(http, &resolve_host(env::var("OLLAMA_HOST").ok()), timeout)
    }

    pub fn new(http: Client, host: &str, timeout: Duration) -> Self {
        Self {
            http,
            host: host.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

fn resolve_host(value: Option<String>) -> String {
    value
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| DEFAULT_HOST.to_string())
}

impl ModelClient for OllamaClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, OllamaError> {
        let url = format!("{}/api/generate", self.host);

        let response = self
            .http
            .post(&url)
            .header("User-Agent", crate::USER_AGENT)
            .json(request)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiError>(&text) {
                Ok(ApiError { error: Some(msg) }) => msg,
                _ => {
                    let end = text.floor_char_boundary(200);
                    format!("HTTP {status}: {}", &text[..end])
                }
            };
            warn!(status = %status, model = %request.model, "ollama generate failed");
            return Err(OllamaError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| OllamaError::Decode(e.to_string()))?;
        debug!(model = %request.model, chars = body.text().len(), "generate complete");
        Ok(body)
    }
}
