//! Caller-facing wire types for `POST /api/chat`.

use serde::{Deserialize, Serialize};

use crate::backend::BackendResponse;

/// Reply sent when the backend answers with the ask-admin sentinel.
pub const ADMIN_REPLY: &str = "I can't answer this. The admin will get back to you.";

/// Reply sent on any backend failure (HTTP 500).
pub const SERVER_ERROR_REPLY: &str = "Server error. Please try again.";

/// Reply sent when the request body is not a JSON object (HTTP 400).
pub const INVALID_REQUEST_REPLY: &str = "Invalid request body.";

/// Inbound body: `{ "message": string }`. A missing or null message is kept as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("request body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("request body must be a JSON object")]
    NotAnObject,
}

impl InboundChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// Parse a raw request body. An empty body is treated as `{}`.
    pub fn from_body(body: &[u8]) -> Result<Self, RequestError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let value: serde_json::Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Err(RequestError::NotAnObject);
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// Outbound body: `{ "reply": string }`, used on every path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundReply {
    pub reply: String,
}

impl OutboundReply {
    /// Map a backend answer to the caller reply; the sentinel becomes [`ADMIN_REPLY`].
    pub fn from_backend(response: BackendResponse) -> Self {
        if response.is_ask_admin() {
            Self {
                reply: ADMIN_REPLY.to_string(),
            }
        } else {
            Self {
                reply: response.bot_response,
            }
        }
    }

    pub fn server_error() -> Self {
        Self {
            reply: SERVER_ERROR_REPLY.to_string(),
        }
    }

    pub fn invalid_request() -> Self {
        Self {
            reply: INVALID_REQUEST_REPLY.to_string(),
        }
    }
}
