use std::env;
use std::path::PathBuf;

use crate::logging;

pub const DATA_DIR_ENV: &str = "FLOWCAST_DATA_DIR";
pub const LOG_LEVEL_ENV: &str = "FLOWCAST_LOG";
pub const LOG_DIR_ENV: &str = "FLOWCAST_LOG_DIR";
pub const PASSPHRASE_ENV: &str = "FLOWCAST_PASSPHRASE";
const APP_DIR: &str = "flowcast";
const DATA_FILE: &str = "data.flowcast";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("data directory not found")]
    NoDataDir,
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
    #[error("unsupported log level `{0}`")]
    LogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_level: String,
    /// Log to rotating files here instead of stderr.
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Resolve configuration from `FLOWCAST_*` variables, falling back to the
    /// platform's local data directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_dir = match non_empty_var(DATA_DIR_ENV)? {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_local_dir()
                .ok_or(ConfigError::NoDataDir)?
                .join(APP_DIR),
        };

        let log_level = match non_empty_var(LOG_LEVEL_ENV)? {
            Some(level) => {
                logging::normalize_level(&level).ok_or(ConfigError::LogLevel(level.clone()))?
            }
            None => logging::default_log_level(),
        };

        let log_dir = non_empty_var(LOG_DIR_ENV)?.map(PathBuf::from);

        Ok(Self {
            data_dir,
            log_level: log_level.to_string(),
            log_dir,
        })
    }

    pub fn data_file(&self) -> PathBuf {
        self.data_dir.join(DATA_FILE)
    }
}

/// Unset is fine; set-but-blank is a mistake worth reporting.
fn non_empty_var(var: &'static str) -> Result<Option<String>, ConfigError> {
    match env::var(var) {
        Ok(value) if value.trim().is_empty() => Err(ConfigError::Empty { var }),
        Ok(value) => Ok(Some(value.trim().to_string())),
        Err(_) => Ok(None),
    }
}
