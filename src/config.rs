//! Client and development-backend configuration.
//!
//! Values come from command-line flags first, then `MURMUR_*` environment
//! variables, then built-in defaults. The binaries parse flags; this module
//! owns the environment layer and the defaults.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use reqwest::Url;

use crate::error::{AppError, AppResult};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;

pub const ENV_API_URL: &str = "MURMUR_API_URL";
pub const ENV_TIMEOUT_MS: &str = "MURMUR_TIMEOUT_MS";
pub const ENV_TRANSPORT_ERRORS_ANONYMOUS: &str = "MURMUR_TRANSPORT_ERRORS_ANONYMOUS";
pub const ENV_HTTP_PORT: &str = "MURMUR_HTTP_PORT";
pub const ENV_BIND: &str = "MURMUR_BIND";
pub const ENV_SEED_DEMO: &str = "MURMUR_SEED_DEMO";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin of the REST backend; endpoint paths are joined onto it.
    pub base_url: Url,
    /// Per-request timeout. `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
    /// When a session check fails below HTTP (connect refused, reset,
    /// timeout), settle to `Anonymous`. When false, the last settled session
    /// is kept instead. Non-2xx answers and malformed bodies always settle to
    /// `Anonymous`.
    pub transport_errors_anonymous: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_URL).expect("DEFAULT_API_URL is a valid URL"),
            timeout: None,
            transport_errors_anonymous: true,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> AppResult<Self> {
        Ok(Self { base_url: parse_base_url(base_url)?, ..Default::default() })
    }

    pub fn from_env() -> AppResult<Self> {
        let mut cfg = Self::default();
        if let Ok(url) = env::var(ENV_API_URL) {
            cfg.base_url = parse_base_url(&url)?;
        }
        if let Some(ms) = parse_u64_env(ENV_TIMEOUT_MS) {
            cfg.timeout = if ms == 0 { None } else { Some(Duration::from_millis(ms)) };
        }
        if let Some(b) = parse_bool_env(ENV_TRANSPORT_ERRORS_ANONYMOUS) {
            cfg.transport_errors_anonymous = b;
        }
        Ok(cfg)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url.join(path).map_err(|e| AppError::config(format!("invalid endpoint {}: {}", path, e)))
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Pre-create a demo user and a handful of posts on startup.
    pub seed_demo: bool,
}

impl Default for ServerConfig {
    fn default() -> Self { Self { bind: DEFAULT_BIND.to_string(), port: DEFAULT_PORT, seed_demo: false } }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(b) = env::var(ENV_BIND) { if !b.trim().is_empty() { cfg.bind = b.trim().to_string(); } }
        if let Some(p) = parse_port_env(ENV_HTTP_PORT) { cfg.port = p; }
        if let Some(s) = parse_bool_env(ENV_SEED_DEMO) { cfg.seed_demo = s; }
        cfg
    }

    pub fn socket_addr(&self) -> AppResult<SocketAddr> {
        format!("{}:{}", self.bind, self.port)
            .parse()
            .map_err(|e| AppError::config(format!("invalid bind address {}:{}: {}", self.bind, self.port, e)))
    }
}

/// Accepts `host:port` shorthand as well as full URLs.
pub fn parse_base_url(raw: &str) -> AppResult<Url> {
    let raw = raw.trim();
    let candidate = if raw.contains("://") { raw.to_string() } else { format!("http://{}", raw) };
    let url = Url::parse(&candidate).map_err(|e| AppError::config(format!("invalid base URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::config(format!("unsupported scheme '{}' in base URL", other))),
    }
}

pub fn parse_port_env(name: &str) -> Option<u16> {
    match env::var(name) {
        Ok(val) => val.trim().parse::<u16>().ok(),
        Err(_) => None,
    }
}

pub fn parse_u64_env(name: &str) -> Option<u64> {
    match env::var(name) {
        Ok(val) => val.trim().parse::<u64>().ok(),
        Err(_) => None,
    }
}

pub fn parse_bool_env(name: &str) -> Option<bool> {
    env::var(name).ok().and_then(|v| parse_bool(&v))
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_shorthand() {
        let u = parse_base_url("localhost:8080").unwrap();
        assert_eq!(u.as_str(), "http://localhost:8080/");
        assert!(parse_base_url("ftp://example.com").is_err());
        assert!(parse_base_url("http://").is_err());
    }

    #[test]
    fn endpoint_joins_absolute_paths() {
        let cfg = ClientConfig::new("http://example.com/app/").unwrap();
        assert_eq!(cfg.endpoint("/api/auth/me").unwrap().as_str(), "http://example.com/api/auth/me");
    }

    #[test]
    fn defaults() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.base_url.as_str(), "http://127.0.0.1:5000/");
        assert!(cfg.timeout.is_none());
        assert!(cfg.transport_errors_anonymous);
        let s = ServerConfig::default();
        assert_eq!(s.socket_addr().unwrap().port(), 5000);
    }

    #[test]
    fn bool_parsing() {
        assert_eq!(parse_bool("YES"), Some(true));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
