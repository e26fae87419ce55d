use std::fmt;

use thiserror::Error;

pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8797";
pub const DEFAULT_LOG_FILTER: &str = "info";

pub const TRANSPORT_ENV: &str = "VENTURED_TRANSPORT";
pub const HTTP_ADDR_ENV: &str = "VENTURED_HTTP_ADDR";
pub const LOG_ENV: &str = "VENTURED_LOG";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("VENTURED_TRANSPORT must be stdio or http, got {0:?}")]
    UnknownTransport(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    Http,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdio => f.write_str("stdio"),
            Self::Http => f.write_str("http"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub transport: Transport,
    pub http_addr: String,
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: Transport::Stdio,
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let transport = match read(TRANSPORT_ENV) {
            None => Transport::Stdio,
            Some(v) => match v.to_ascii_lowercase().as_str() {
                "stdio" => Transport::Stdio,
                "http" => Transport::Http,
                _ => return Err(ConfigError::UnknownTransport(v)),
            },
        };
        let http_addr = read(HTTP_ADDR_ENV).unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());
        let log_filter = log_filter_from(&lookup);

        Ok(Self {
            transport,
            http_addr,
            log_filter,
        })
    }
}

/// Tracing filter directive, readable before the rest of the config is validated.
pub fn log_filter_from_env() -> String {
    log_filter_from(&|name: &str| std::env::var(name).ok())
}

fn log_filter_from<F>(lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(LOG_ENV)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect::<HashMap<_, _>>();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let cfg = ServerConfig::from_lookup(lookup(&[])).expect("config");
        assert_eq!(cfg, ServerConfig::default());
    }

    #[test]
    fn reads_http_transport_and_address() {
        let cfg = ServerConfig::from_lookup(lookup(&[
            (TRANSPORT_ENV, " HTTP "),
            (HTTP_ADDR_ENV, "0.0.0.0:9000"),
            (LOG_ENV, "venture_mcp=debug"),
        ]))
        .expect("config");

        assert_eq!(cfg.transport, Transport::Http);
        assert_eq!(cfg.http_addr, "0.0.0.0:9000");
        assert_eq!(cfg.log_filter, "venture_mcp=debug");
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let cfg = ServerConfig::from_lookup(lookup(&[(HTTP_ADDR_ENV, "   "), (LOG_ENV, "")]))
            .expect("config");
        assert_eq!(cfg.http_addr, DEFAULT_HTTP_ADDR);
        assert_eq!(cfg.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn rejects_unknown_transport() {
        let err = ServerConfig::from_lookup(lookup(&[(TRANSPORT_ENV, "carrier-pigeon")]))
            .expect_err("unknown transport");
        assert_eq!(err, ConfigError::UnknownTransport("carrier-pigeon".to_string()));
        assert!(err.to_string().contains(TRANSPORT_ENV));
    }
}
