use crate::config::WidgetConfig;
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const CHAT_PATH: &str = "/api/chat";
const SERVER_ERROR_FALLBACK: &str = "Server error";

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Non-success status; carries the body's `error` field or a fallback.
    #[error("{0}")]
    Server(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response did not include a reply")]
    MissingReply,
}

pub type ChatResult<T> = Result<T, ChatError>;

/// Anything that can turn a user message into a reply.
#[async_trait(?Send)]
pub trait ChatBackend {
    async fn send(&self, message: &str) -> ChatResult<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    reply: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the `/api/chat` endpoint
pub struct ChatClient {
    client: reqwest::Client,
    endpoint: Url,
    timeout: Option<Duration>,
}

impl ChatClient {
    pub fn new(base_url: &Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: chat_endpoint(base_url),
            timeout: None,
        }
    }

    pub fn from_config(config: &WidgetConfig) -> Self {
        let mut client = Self::new(&config.base_url);
        client.timeout = config.timeout;
        client
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn chat_endpoint(base_url: &Url) -> Url {
    let mut endpoint = base_url.clone();
    let prefix = base_url.path().trim_end_matches('/');
    endpoint.set_path(&format!("{prefix}{CHAT_PATH}"));
    endpoint
}

#[async_trait(?Send)]
impl ChatBackend for ChatClient {
    async fn send(&self, message: &str) -> ChatResult<String> {
        tracing::debug!(endpoint = %self.endpoint, "sending chat message");

        #[allow(unused_mut)]
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .json(&ChatRequest { message });

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        // The body is decoded before the status is inspected: a non-JSON
        // error page is a decode failure, not a server error.
        let parsed: ChatResponse = serde_json::from_str(&body)?;

        if !status.is_success() {
            let message = parsed
                .error
                .filter(|err| !err.is_empty())
                .unwrap_or_else(|| SERVER_ERROR_FALLBACK.to_string());
            tracing::warn!(%status, "chat endpoint returned an error: {message}");
            return Err(ChatError::Server(message));
        }

        parsed.reply.ok_or(ChatError::MissingReply)
    }
}
