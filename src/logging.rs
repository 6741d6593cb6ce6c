//! Logging setup
//!
//! Structured logging through `tracing`. `RUST_LOG` takes precedence over
//! the configured level.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (e.g., "info", "debug", "trace")
    pub level: String,
    /// Whether to use JSON format (vs. human-readable)
    pub json: bool,
    /// Event log that every line is also appended to, without colours
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

/// Opens `path` for appending, creating it and its parent directories
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize logging for the application
///
/// Should be called once at startup; a second call is a no-op. Fails only
/// when the configured log file cannot be opened.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file_layer = match &config.file {
        Some(path) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(open_log_file(path)?)),
        ),
        None => None,
    };

    let result = if config.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .with(fmt::layer().with_target(false))
            .try_init()
    };

    match result {
        Ok(()) => tracing::debug!(
            level = %config.level,
            json = config.json,
            file = ?config.file,
            "logging initialized"
        ),
        Err(e) => tracing::debug!("logging already initialized: {}", e),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.json);
        assert!(config.file.is_none());
    }

    #[test]
    fn init_twice_does_not_panic() {
        let config = LogConfig {
            level: "debug".to_string(),
            json: true,
            file: None,
        };
        init_logging(&config).unwrap();
        init_logging(&config).unwrap();
    }

    #[test]
    fn log_file_is_created_and_appended() {
        let dir = std::env::temp_dir().join(format!("lpg-logs-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("events.log");

        writeln!(open_log_file(&path).unwrap(), "first").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn unopenable_log_file_is_an_error() {
        let dir = std::env::temp_dir().join(format!("lpg-logs-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();

        let config = LogConfig {
            file: Some(dir.clone()),
            ..LogConfig::default()
        };
        assert!(init_logging(&config).is_err());
        fs::remove_dir_all(dir).unwrap();
    }
}
