//! NLP backend client.
//!
//! The backend is an opaque HTTP peer: it takes `{ "query_text" }` and answers `{ "bot_response" }`.

mod client;

pub use client::{BackendError, BackendRequest, BackendResponse, NlpClient, ASK_ADMIN_SENTINEL};
