//! Relay: HTTP server that adapts `{ message }` chat requests to the NLP backend and back.
//!
//! Single port serves the chat endpoint and a health probe. Stateless per request.

mod protocol;
mod server;

pub use protocol::{
    InboundChatRequest, OutboundReply, RequestError, ADMIN_REPLY, INVALID_REQUEST_REPLY,
    SERVER_ERROR_REPLY,
};
pub use server::{relay_chat, reply_status, router, run_relay, serve, RelayState};
