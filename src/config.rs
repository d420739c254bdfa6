//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Default delay between dismissing the re-sign-in modal and opening the
/// login overlay.
pub const DEFAULT_SIGN_IN_DELAY: Duration = Duration::from_millis(300);

/// Runtime configuration for the state server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path of the libSQL database backing the key-value store.
    pub db_path: PathBuf,
    /// Port for the local HTTP surface.
    pub port: u16,
    /// Delay before the login overlay is presented after "sign back in".
    pub sign_in_delay: Duration,
    /// Optional directory for daily-rotated log files.
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/poopai-state.db"),
            port: 8080,
            sign_in_delay: DEFAULT_SIGN_IN_DELAY,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Build a config from `POOPAI_*` environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("POOPAI_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(port) = lookup("POOPAI_PORT") {
            config.port = parse_value("POOPAI_PORT", &port)?;
        }
        if let Some(ms) = lookup("POOPAI_SIGN_IN_DELAY_MS") {
            config.sign_in_delay = Duration::from_millis(parse_value("POOPAI_SIGN_IN_DELAY_MS", &ms)?);
        }
        config.log_dir = lookup("POOPAI_LOG_DIR").map(PathBuf::from);

        Ok(config)
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{raw:?}: {e}"),
    })
}
