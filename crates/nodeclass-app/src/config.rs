//! Environment-driven application settings.

use std::net::SocketAddr;
use std::path::PathBuf;

use nodeclass_telemetry::{DEFAULT_LOG_LEVEL, LogFormat};

use crate::error::{AppError, AppResult};

/// Directory holding `hosts.yaml`, `groups.yaml` and `users.yaml`.
pub const ENV_DATA_DIR: &str = "NODECLASS_DATA_DIR";
/// Listener address.
pub const ENV_BIND_ADDR: &str = "NODECLASS_BIND_ADDR";
/// Log level or filter directive.
pub const ENV_LOG_LEVEL: &str = "NODECLASS_LOG_LEVEL";
/// `json` or `pretty`.
pub const ENV_LOG_FORMAT: &str = "NODECLASS_LOG_FORMAT";

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Settings the service starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding the collection documents.
    pub data_dir: PathBuf,
    /// Address the API listens on.
    pub bind_addr: SocketAddr,
    /// Log level or filter directive.
    pub log_level: String,
    /// Log output format.
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Read settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidConfig`] when a variable is set to an
    /// unusable value.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`, falling back to defaults for unset or
    /// blank variables.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidConfig`] when a variable is set to an
    /// unusable value.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let data_dir =
            read(ENV_DATA_DIR).map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);

        let bind_raw = read(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| AppError::InvalidConfig {
                field: ENV_BIND_ADDR,
                reason: "not_a_socket_address",
                value: Some(bind_raw),
            })?;

        let log_level = read(ENV_LOG_LEVEL).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        let log_format = match read(ENV_LOG_FORMAT) {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|_| AppError::InvalidConfig {
                    field: ENV_LOG_FORMAT,
                    reason: "unknown_format",
                    value: Some(raw),
                })?,
            None => LogFormat::infer(),
        };

        Ok(Self {
            data_dir,
            bind_addr,
            log_level,
            log_format,
        })
    }
}
