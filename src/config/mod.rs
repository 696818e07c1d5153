//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::game::ControlScheme;

/// Log output format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,

    /// Control scheme for this deployment
    pub control_scheme: ControlScheme,
    /// Optional JSON roster; the built-in roster is used when unset
    pub roster_path: Option<PathBuf>,
    /// Seed for spawn positions; random when unset
    pub arena_seed: Option<u64>,

    /// Allowed client origins for CORS (any origin when empty)
    pub client_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = match lookup("PORT") {
            Some(port) => format!("0.0.0.0:{}", port),
            None => lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
        };

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("pretty") | Some("") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(ConfigError::Invalid("LOG_FORMAT", other.to_string())),
        };

        let control_scheme = match lookup("CONTROL_SCHEME") {
            Some(value) => value
                .parse()
                .map_err(|bad| ConfigError::Invalid("CONTROL_SCHEME", bad))?,
            None => ControlScheme::default(),
        };

        let arena_seed = lookup("ARENA_SEED")
            .map(|value| {
                value
                    .parse::<u64>()
                    .map_err(|_| ConfigError::Invalid("ARENA_SEED", value))
            })
            .transpose()?;

        let client_origins = lookup("CLIENT_ORIGIN")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_format,
            control_scheme,
            roster_path: lookup("ROSTER_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            arena_seed,
            client_origins,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server address format")]
    InvalidAddress,

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
