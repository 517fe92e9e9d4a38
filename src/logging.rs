//! Logging bootstrap.
//!
//! Events are metadata-only `key=value` lines. Entry notes and passphrases
//! never reach a log call.

use std::path::Path;

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};

const LOG_FILE_BASENAME: &str = "flowcast";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("unsupported log level `{0}`")]
    Level(String),
    #[error("failed to create log directory `{path}`: {source}")]
    Directory {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to start logger: {0}")]
    Backend(#[from] flexi_logger::FlexiLoggerError),
}

/// Map a user-supplied level onto one of the supported names.
pub fn normalize_level(level: &str) -> Option<&'static str> {
    let wanted = level.trim().to_ascii_lowercase();
    LEVELS.iter().copied().find(|l| *l == wanted)
}

pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Start the global logger. Logs go to stderr, or to size-rotated files when
/// `log_dir` is given. Keep the returned handle alive for the process lifetime.
pub fn init_logging(level: &str, log_dir: Option<&Path>) -> Result<LoggerHandle, LoggingError> {
    let level = normalize_level(level).ok_or_else(|| LoggingError::Level(level.to_string()))?;
    let logger = Logger::try_with_str(level)?;

    let handle = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::Directory {
                path: dir.display().to_string(),
                source,
            })?;
            logger
                .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
                .rotate(
                    Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(MAX_LOG_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
                .start()?
        }
        None => logger.log_to_stderr().start()?,
    };

    log::info!(
        "event=app_start module=logging status=ok platform={} version={} level={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION"),
        level
    );
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_normalize() {
        assert_eq!(normalize_level("INFO"), Some("info"));
        assert_eq!(normalize_level(" warn "), Some("warn"));
        assert_eq!(normalize_level("verbose"), None);
    }

    #[test]
    fn default_level_is_supported() {
        assert!(normalize_level(default_log_level()).is_some());
    }

    #[test]
    fn unsupported_level_rejected_before_backend() {
        assert!(matches!(
            init_logging("chatty", None),
            Err(LoggingError::Level(_))
        ));
    }
}
