//! Process configuration, read once at startup.
//!
//! The relay reads `BACKEND_URL`, `BACKEND_TOKEN`, `RELAY_ADDR`,
//! `RELAY_CORS_ORIGINS` and `RELAY_STATIC_DIR`. The UI reads `CHAT_RELAY_URL`,
//! falling back to the bundled `assets/config.env` for builds without a
//! process environment.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;

/// Bundled config for builds that ship without a `.env` (web, mobile)
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

pub const DEFAULT_LISTEN_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 3000));

/// Origins `dx serve` uses for the web UI during development.
pub const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://127.0.0.1:8080", "http://localhost:8080"];

/// Relay origin the UI posts to when nothing is configured.
pub fn default_relay_url() -> String {
    format!("http://{DEFAULT_LISTEN_ADDR}")
}

static BUNDLED: Lazy<HashMap<String, String>> = Lazy::new(|| parse_env_file(BUNDLED_CONFIG));

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Load `.env` into the process environment if one exists.
#[cfg(not(target_arch = "wasm32"))]
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env");
    }
}

#[cfg(target_arch = "wasm32")]
pub fn load_dotenv() {}

/// Settings for the relay server.
#[derive(Clone, Debug, PartialEq)]
pub struct RelayConfig {
    /// Base address of the backend; `/chat` is appended per request.
    pub backend_url: String,
    /// Bearer credential for the backend hop. Never sent to the browser.
    pub backend_token: Option<String>,
    pub listen_addr: SocketAddr,
    /// Origins allowed to call the relay cross-origin. Empty disables CORS.
    pub cors_origins: Vec<String>,
    /// Built web UI served at every path other than the chat route.
    pub static_dir: Option<PathBuf>,
}

impl RelayConfig {
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            backend_token: None,
            listen_addr: DEFAULT_LISTEN_ADDR,
            cors_origins: Vec::new(),
            static_dir: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.backend_token = Some(token.into());
        self
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend_url = get("BACKEND_URL").ok_or(ConfigError::Missing("BACKEND_URL"))?;
        let backend_token = get("BACKEND_TOKEN");

        let listen_addr = match get("RELAY_ADDR") {
            Some(raw) => raw
                .trim()
                .parse::<SocketAddr>()
                .map_err(|e| ConfigError::Invalid {
                    key: "RELAY_ADDR",
                    value: raw.clone(),
                    reason: e.to_string(),
                })?,
            None => DEFAULT_LISTEN_ADDR,
        };

        // `none` switches CORS off entirely.
        let cors_origins = match get("RELAY_CORS_ORIGINS") {
            Some(raw) if raw.trim().eq_ignore_ascii_case("none") => Vec::new(),
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        let static_dir = get("RELAY_STATIC_DIR").map(|dir| PathBuf::from(dir.trim()));

        Ok(Self {
            backend_url: backend_url.trim().to_string(),
            backend_token,
            listen_addr,
            cors_origins,
            static_dir,
        })
    }

    /// Full URL of the backend chat route.
    pub fn chat_url(&self) -> String {
        format!("{}/chat", self.backend_url.trim_end_matches('/'))
    }
}

/// Settings for the chat UI.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    /// Origin serving `/api/chat`.
    pub relay_url: String,
}

impl ClientConfig {
    pub fn load() -> Self {
        let relay_url = setting("CHAT_RELAY_URL").unwrap_or_else(default_relay_url);
        Self { relay_url }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: default_relay_url(),
        }
    }
}

/// Environment first, bundled config second.
fn setting(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .or_else(|| BUNDLED.get(key).cloned())
        .filter(|v| !v.trim().is_empty())
}

fn parse_env_file(contents: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();
    for line in contents.lines() {
        let line = line.trim();
        // Skip comments and empty lines
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            values.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_backend_url_is_an_error() {
        let err = RelayConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("BACKEND_URL")));

        let err = RelayConfig::from_lookup(lookup(&[("BACKEND_URL", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("BACKEND_URL")));
    }

    #[test]
    fn test_defaults() {
        let config =
            RelayConfig::from_lookup(lookup(&[("BACKEND_URL", "http://backend:8080")])).unwrap();
        assert_eq!(config.backend_token, None);
        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR);
        assert_eq!(config.listen_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.cors_origins, DEFAULT_CORS_ORIGINS);
        assert_eq!(config.static_dir, None);
        assert_eq!(config.chat_url(), "http://backend:8080/chat");
    }

    #[test]
    fn test_blank_token_counts_as_unset() {
        let config = RelayConfig::from_lookup(lookup(&[
            ("BACKEND_URL", "http://backend"),
            ("BACKEND_TOKEN", ""),
        ]))
        .unwrap();
        assert_eq!(config.backend_token, None);
    }

    #[test]
    fn test_full_relay_config() {
        let config = RelayConfig::from_lookup(lookup(&[
            ("BACKEND_URL", "http://backend/"),
            ("BACKEND_TOKEN", "abc"),
            ("RELAY_ADDR", "0.0.0.0:8081"),
            ("RELAY_CORS_ORIGINS", "http://localhost:8080, ,http://127.0.0.1:8080"),
            ("RELAY_STATIC_DIR", "dist/public"),
        ]))
        .unwrap();
        assert_eq!(config.backend_token.as_deref(), Some("abc"));
        assert_eq!(config.listen_addr.port(), 8081);
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:8080", "http://127.0.0.1:8080"]
        );
        assert_eq!(config.chat_url(), "http://backend/chat");
        assert_eq!(config.static_dir, Some(PathBuf::from("dist/public")));
    }

    #[test]
    fn test_cors_can_be_switched_off() {
        let config = RelayConfig::from_lookup(lookup(&[
            ("BACKEND_URL", "http://backend"),
            ("RELAY_CORS_ORIGINS", "none"),
        ]))
        .unwrap();
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_new_and_default_relay_url_share_listen_addr() {
        let config = RelayConfig::new("http://backend");
        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR);
        assert_eq!(
            ClientConfig::default().relay_url,
            format!("http://{}", config.listen_addr)
        );
    }

    #[test]
    fn test_invalid_listen_addr() {
        let err = RelayConfig::from_lookup(lookup(&[
            ("BACKEND_URL", "http://backend"),
            ("RELAY_ADDR", "not-an-addr"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "RELAY_ADDR", .. }));
    }

    #[test]
    fn test_parse_env_file() {
        let values = parse_env_file("# comment\n\nCHAT_RELAY_URL = http://x:1\nBROKEN\n");
        assert_eq!(values.get("CHAT_RELAY_URL").map(String::as_str), Some("http://x:1"));
        assert_eq!(values.len(), 1);
    }
}
