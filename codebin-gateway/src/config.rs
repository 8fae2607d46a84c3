//! Process configuration read from the environment at startup.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveTime;
use codebin_core::Ttl;

/// Default upstream for `POST /dart`.
pub const DEFAULT_COMPILE_URL: &str = "https://master.api.dartpad.dev/api/v3/compileDDC";

/// A `CODEBIN_*` variable is set but cannot be parsed.
#[derive(Debug, thiserror::Error)]
#[error("invalid {var}={value:?}: {reason}")]
pub struct ConfigError {
    /// Name of the offending variable.
    pub var: &'static str,
    /// The raw value found in the environment.
    pub value: String,
    /// Parser message.
    pub reason: String,
}

impl ConfigError {
    fn new(var: &'static str, value: &str, reason: impl std::fmt::Display) -> Self {
        Self { var, value: value.to_owned(), reason: reason.to_string() }
    }
}

/// Gateway settings.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct GatewayConfig {
    /// Socket address to listen on.
    pub listen_addr: String,

    /// Root of the file store; `None` keeps snippets in memory.
    pub data_dir: Option<PathBuf>,

    /// Compile endpoint the `/dart` route forwards to.
    pub compile_url: String,

    /// Timeout for one upstream compile request.
    pub compile_timeout: Duration,

    /// UTC time of day the daily sweep runs.
    pub sweep_at: NaiveTime,

    /// Snippet retention window.
    pub ttl: Ttl,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8000".to_owned(),
            data_dir: None,
            compile_url: DEFAULT_COMPILE_URL.to_owned(),
            compile_timeout: Duration::from_secs(30),
            sweep_at: NaiveTime::from_hms_opt(6, 30, 0).unwrap_or(NaiveTime::MIN),
            ttl: Ttl::DEFAULT,
        }
    }
}

impl GatewayConfig {
    /// Read `CODEBIN_*` variables from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if a variable is set but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    ///
    /// Unset and empty variables fall back to the defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if a variable is set but malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(addr) = get("CODEBIN_LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        config.data_dir = get("CODEBIN_DATA_DIR").map(PathBuf::from);
        if let Some(url) = get("CODEBIN_COMPILE_URL") {
            config.compile_url = url;
        }
        if let Some(secs) = get("CODEBIN_COMPILE_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e| ConfigError::new("CODEBIN_COMPILE_TIMEOUT_SECS", &secs, e))?;
            config.compile_timeout = Duration::from_secs(secs);
        }
        if let Some(at) = get("CODEBIN_SWEEP_AT") {
            config.sweep_at = NaiveTime::parse_from_str(at.trim(), "%H:%M")
                .map_err(|e| ConfigError::new("CODEBIN_SWEEP_AT", &at, e))?;
        }
        if let Some(days) = get("CODEBIN_TTL_DAYS") {
            let days: u32 = days
                .trim()
                .parse()
                .map_err(|e| ConfigError::new("CODEBIN_TTL_DAYS", &days, e))?;
            config.ttl = Ttl::from_days(days);
        }
        Ok(config)
    }
}
