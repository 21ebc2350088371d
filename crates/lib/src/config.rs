//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.chat-relay/config.json`) and environment.
//! Precedence, lowest first: defaults, file, environment, CLI flags (applied by the binary).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Listener settings for the relay.
    #[serde(default)]
    pub server: ServerConfig,

    /// NLP backend the relay forwards to.
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Relay bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// HTTP port (default 5000). Overridden by CHAT_RELAY_PORT env.
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0", all interfaces).
    #[serde(default = "default_server_bind")]
    pub bind: String,
}

/// NLP backend address and call options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    /// Full URL of the backend chat endpoint. Overridden by CHAT_RELAY_BACKEND_URL env.
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// Per-request timeout in seconds. When absent the transport default applies (no explicit timeout).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_server_port() -> u16 {
    5000
}

fn default_server_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_backend_url() -> String {
    "http://localhost:5001/chat_api/chat".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            bind: default_server_bind(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            timeout_secs: None,
        }
    }
}

/// Trimmed, non-empty value of an environment variable.
fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

/// Resolve the backend URL: env CHAT_RELAY_BACKEND_URL overrides config.
pub fn resolve_backend_url(config: &Config) -> String {
    env_non_empty("CHAT_RELAY_BACKEND_URL").unwrap_or_else(|| config.backend.url.trim().to_string())
}

/// Resolve the listening port: env CHAT_RELAY_PORT overrides config. Unparseable values are ignored.
pub fn resolve_server_port(config: &Config) -> u16 {
    match env_non_empty("CHAT_RELAY_PORT") {
        Some(p) => p.parse().unwrap_or_else(|_| {
            log::warn!("ignoring invalid CHAT_RELAY_PORT value: {}", p);
            config.server.port
        }),
        None => config.server.port,
    }
}

/// Apply environment overrides in place.
pub fn apply_env_overrides(config: &mut Config) {
    config.backend.url = resolve_backend_url(config);
    config.server.port = resolve_server_port(config);
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("CHAT_RELAY_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".chat-relay").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path (or the default path). Missing file => default config.
/// Environment overrides are applied after the file. Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let mut config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    apply_env_overrides(&mut config);
    Ok((config, path))
}
