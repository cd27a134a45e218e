//! Process configuration loaded from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `MANDI_BIND_ADDR` | `0.0.0.0:8080` |
//! | `DATABASE_URL` | unset: no store, the fallback catalog is served |
//! | `MANDI_MODEL_EXECUTABLE` | `python3` |
//! | `MANDI_MODEL_SCRIPT` | `python/modelService.py` |
//! | `MANDI_MODEL_WORKDIR` | unset: inherit the server's working directory |
//! | `MANDI_MODEL_TIMEOUT_SECS` | `30` |
//! | `MANDI_CACHE_FRESHNESS_SECS` | `300` |
//! | `MANDI_LOG_FORMAT` | `json` (or `pretty`) |

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use mandi_bridge::BridgeConfig;
use mandi_observability::LogFormat;

use crate::identity::IdentityCacheConfig;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

impl ConfigError {
    fn invalid(var: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            message: message.into(),
        }
    }
}

/// Everything the server needs at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Postgres URL of the product system of record, if any.
    pub database_url: Option<String>,
    pub bridge: BridgeConfig,
    pub cache: IdentityCacheConfig,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset and blank values both
    /// fall back to the default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = get("MANDI_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("MANDI_BIND_ADDR", e.to_string()))?;

        let mut bridge = BridgeConfig::default();
        if let Some(exe) = get("MANDI_MODEL_EXECUTABLE") {
            bridge.executable = exe.into();
        }
        if let Some(script) = get("MANDI_MODEL_SCRIPT") {
            bridge.script = script;
        }
        if let Some(dir) = get("MANDI_MODEL_WORKDIR") {
            bridge = bridge.with_working_dir(dir);
        }
        if let Some(secs) = parse_secs(&get, "MANDI_MODEL_TIMEOUT_SECS")? {
            bridge = bridge.with_default_timeout(secs);
        }

        let mut cache = IdentityCacheConfig::default();
        if let Some(window) = parse_secs(&get, "MANDI_CACHE_FRESHNESS_SECS")? {
            cache = cache.with_freshness_window(window);
        }

        let log_format = match get("MANDI_LOG_FORMAT") {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::invalid("MANDI_LOG_FORMAT", e.to_string()))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr,
            database_url: get("DATABASE_URL"),
            bridge,
            cache,
            log_format,
        })
    }
}

fn parse_secs(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    let Some(raw) = get(var) else {
        return Ok(None);
    };
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::invalid(var, format!("`{raw}` is not a whole number of seconds: {e}")))?;
    if secs == 0 {
        return Err(ConfigError::invalid(var, "must be greater than zero"));
    }
    Ok(Some(Duration::from_secs(secs)))
}
