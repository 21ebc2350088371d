//! Chat relay library: configuration, NLP backend client, and the relay HTTP server
//! used by the `chat-relay` binary.

pub mod backend;
pub mod config;
pub mod init;
pub mod relay;
