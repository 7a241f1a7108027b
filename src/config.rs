//! Service configuration
//!
//! Loaded from environment variables (after `.env` is read by the binary)
//! with defaults suitable for local development.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TEAM_INFO_DIR: &str = "team_info";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_ENHANCER_URL: &str = "https://api.openai.com";
const DEFAULT_ENHANCER_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 2048;
const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Invalid configuration value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} has invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Connection settings for the enhancement collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct EnhancerConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub team_info_dir: PathBuf,
    pub host: IpAddr,
    pub port: u16,
    /// `None` when no API key is configured; enhancement is then disabled
    pub enhancer: Option<EnhancerConfig>,
    pub enhancement_timeout: Duration,
}

impl AppConfig {
    /// Create AppConfig from environment variables.
    ///
    /// Environment variables:
    /// - `TEAM_INFO_DIR`: Directory of team profile files (default: team_info)
    /// - `SERVER_HOST`: Bind address (default: 0.0.0.0)
    /// - `SERVER_PORT`: Bind port (default: 8000)
    /// - `ENHANCER_API_KEY`: Enables enhancement when set and non-empty
    /// - `ENHANCER_API_URL`: Chat-completions base URL (default: https://api.openai.com)
    /// - `ENHANCER_MODEL`: Model name (default: gpt-4o-mini)
    /// - `ENHANCER_TEMPERATURE`: Sampling temperature (default: 0.7)
    /// - `ENHANCER_MAX_TOKENS`: Reply token cap (default: 2048)
    /// - `ENHANCER_TIMEOUT_MS`: Per-team enhancement timeout (default: 5000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create AppConfig from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let team_info_dir = get("TEAM_INFO_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TEAM_INFO_DIR));

        let host = parse_or("SERVER_HOST", get("SERVER_HOST"), || IpAddr::from([0, 0, 0, 0]))?;
        let port = parse_or("SERVER_PORT", get("SERVER_PORT"), || DEFAULT_PORT)?;
        let timeout_ms = parse_or("ENHANCER_TIMEOUT_MS", get("ENHANCER_TIMEOUT_MS"), || {
            DEFAULT_TIMEOUT_MS
        })?;

        let enhancer = match get("ENHANCER_API_KEY") {
            Some(api_key) => Some(EnhancerConfig {
                api_key,
                api_url: get("ENHANCER_API_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_ENHANCER_URL.to_string()),
                model: get("ENHANCER_MODEL").unwrap_or_else(|| DEFAULT_ENHANCER_MODEL.to_string()),
                temperature: parse_or("ENHANCER_TEMPERATURE", get("ENHANCER_TEMPERATURE"), || {
                    DEFAULT_TEMPERATURE
                })?,
                max_tokens: parse_or("ENHANCER_MAX_TOKENS", get("ENHANCER_MAX_TOKENS"), || {
                    DEFAULT_MAX_TOKENS
                })?,
            }),
            None => None,
        };

        Ok(Self {
            team_info_dir,
            host,
            port,
            enhancer,
            enhancement_timeout: Duration::from_millis(timeout_ms),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T, D>(key: &'static str, raw: Option<String>, default: D) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    D: FnOnce() -> T,
{
    match raw {
        None => Ok(default()),
        Some(value) => value.parse().map_err(|err: T::Err| ConfigError::Invalid {
            key,
            reason: err.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]).unwrap();

        assert_eq!(config.team_info_dir, PathBuf::from("team_info"));
        assert_eq!(config.socket_addr(), SocketAddr::from(([0, 0, 0, 0], 8000)));
        assert_eq!(config.enhancement_timeout, Duration::from_secs(5));
        assert!(config.enhancer.is_none());
    }

    #[test]
    fn api_key_enables_enhancer_with_defaults() {
        let config = config(&[("ENHANCER_API_KEY", "sk-test")]).unwrap();
        let enhancer = config.enhancer.unwrap();

        assert_eq!(enhancer.api_key, "sk-test");
        assert_eq!(enhancer.api_url, "https://api.openai.com");
        assert_eq!(enhancer.model, "gpt-4o-mini");
        assert_eq!(enhancer.max_tokens, 2048);
    }

    #[test]
    fn blank_api_key_keeps_enhancer_disabled() {
        let config = config(&[("ENHANCER_API_KEY", "   ")]).unwrap();
        assert!(config.enhancer.is_none());
    }

    #[test]
    fn overrides_are_read() {
        let config = config(&[
            ("TEAM_INFO_DIR", "/srv/teams"),
            ("SERVER_HOST", "127.0.0.1"),
            ("SERVER_PORT", "9100"),
            ("ENHANCER_TIMEOUT_MS", "250"),
            ("ENHANCER_API_KEY", "k"),
            ("ENHANCER_API_URL", "http://localhost:11434/"),
        ])
        .unwrap();

        assert_eq!(config.team_info_dir, PathBuf::from("/srv/teams"));
        assert_eq!(config.socket_addr(), SocketAddr::from(([127, 0, 0, 1], 9100)));
        assert_eq!(config.enhancement_timeout, Duration::from_millis(250));
        assert_eq!(config.enhancer.unwrap().api_url, "http://localhost:11434");
    }

    #[test]
    fn unparseable_number_is_an_error() {
        let err = config(&[("SERVER_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SERVER_PORT", .. }));
    }
}
