//! NLP backend HTTP client (http://localhost:5001/chat_api/chat by default).
//! One POST per call; no retries.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::BackendConfig;

/// Value of `bot_response` meaning the backend defers to a human.
pub const ASK_ADMIN_SENTINEL: &str = "ASK_ADMIN";

/// Client for the NLP backend chat endpoint.
#[derive(Clone)]
pub struct NlpClient {
    url: String,
    timeout: Option<Duration>,
    client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("backend returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("backend response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Body sent to the backend. `query_text` is `null` when the caller sent no message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendRequest {
    pub query_text: Option<String>,
}

/// Body expected from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendResponse {
    pub bot_response: String,
}

impl BackendResponse {
    /// True when the backend answered with the ask-admin sentinel.
    pub fn is_ask_admin(&self) -> bool {
        self.bot_response == ASK_ADMIN_SENTINEL
    }
}

impl NlpClient {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            url: url.into().trim().to_string(),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(config.url.clone(), config.timeout_secs.map(Duration::from_secs))
    }

    /// Backend chat endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST the query to the backend and decode `{ "bot_response" }`.
    /// A non-2xx answer that still carries `bot_response` is relayed; otherwise it is a `Status` error.
    pub async fn chat(&self, query_text: Option<&str>) -> Result<BackendResponse, BackendError> {
        let body = BackendRequest {
            query_text: query_text.map(str::to_string),
        };
        let mut req = self.client.post(&self.url).json(&body);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let res = req.send().await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return match serde_json::from_str::<BackendResponse>(&text) {
                Ok(data) => {
                    log::warn!("backend answered {} with a bot_response; relaying it", status);
                    Ok(data)
                }
                Err(_) => Err(BackendError::Status { status, body: text }),
            };
        }
        let data: BackendResponse = serde_json::from_str(&text)?;
        Ok(data)
    }
}
