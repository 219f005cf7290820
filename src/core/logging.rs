//! Logging Setup
//!
//! Structured logging for the search layer:
//! - JSON file output with daily rotation (tracing-appender)
//! - Optional pretty console output
//! - `log` macros forwarded into `tracing`
//! - Gzip compression of rotated files (flate2)

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Log file prefix; the appender adds `.YYYY-MM-DD`
const LOG_FILE_PREFIX: &str = "civic-search.log";

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to create log directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to install subscriber: {0}")]
    Init(String),
}

/// `[logging]` configuration section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Override the log directory (defaults to the platform data dir)
    pub directory: Option<PathBuf>,
    /// Also write human-readable output to stdout
    pub console: bool,
    /// Gzip rotated files in the background at startup
    pub compress_rotated: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            console: true,
            compress_rotated: true,
        }
    }
}

impl LoggingConfig {
    pub fn log_dir(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("civic-search").join("logs"))
                .unwrap_or_else(|| PathBuf::from("logs"))
        })
    }
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the global subscriber.
///
/// The returned guard flushes buffered file output when dropped, so keep it
/// alive for the life of the process.
pub fn init(config: &LoggingConfig) -> Result<WorkerGuard, LoggingError> {
    let log_dir = config.log_dir();
    fs::create_dir_all(&log_dir).map_err(|source| LoggingError::Directory {
        path: log_dir.clone(),
        source,
    })?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // File Layer: JSON for ingestion
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(env_filter(&config.level));

    let stdout_layer = config.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .pretty()
            .with_filter(env_filter(&config.level))
    });

    // try_init also routes `log` records through tracing
    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    if config.compress_rotated {
        let dir = log_dir.clone();
        std::thread::spawn(move || {
            compress_old_logs(&dir);
        });
    }

    log::info!(
        "Logging initialized. Writing to: {:?} (daily rolling)",
        log_dir.join(LOG_FILE_PREFIX)
    );

    Ok(guard)
}

/// Compress rotated log files other than today's; returns how many were compressed
pub(crate) fn compress_old_logs(log_dir: &Path) -> usize {
    let today_suffix = chrono::Local::now().format("%Y-%m-%d").to_string();
    let rotated_prefix = format!("{}.", LOG_FILE_PREFIX);

    let Ok(entries) = fs::read_dir(log_dir) else {
        return 0;
    };

    let mut compressed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        let should_compress = name.starts_with(&rotated_prefix)
            && !name.ends_with(&today_suffix)
            && !name.ends_with(".gz");

        if should_compress {
            match compress_file(&path) {
                Ok(()) => {
                    log::info!("Compressed old log: {:?}", path);
                    compressed += 1;
                }
                Err(e) => log::warn!("Failed to compress old log {:?}: {}", path, e),
            }
        }
    }
    compressed
}

fn compress_file(path: &Path) -> io::Result<()> {
    let mut reader = io::BufReader::new(fs::File::open(path)?);

    let mut gz_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "No filename"))?
        .to_os_string();
    gz_name.push(".gz");
    let gz_path = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "No parent directory"))?
        .join(gz_name);

    // Skip if already exists
    if gz_path.exists() {
        return Ok(());
    }

    let mut encoder = GzEncoder::new(fs::File::create(&gz_path)?, Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?;

    fs::remove_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.console);
        assert!(config.log_dir().ends_with("logs"));
    }

    #[test]
    fn test_directory_override() {
        let config = LoggingConfig {
            directory: Some(PathBuf::from("/tmp/civic-logs")),
            ..Default::default()
        };
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/civic-logs"));
    }

    #[test]
    fn test_compress_old_logs() {
        let dir = tempfile::tempdir().unwrap();
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();

        let old = dir.path().join("civic-search.log.2020-01-01");
        let current = dir.path().join(format!("civic-search.log.{}", today));
        let unrelated = dir.path().join("notes.txt");
        fs::write(&old, "old entries").unwrap();
        fs::write(&current, "today").unwrap();
        fs::write(&unrelated, "keep").unwrap();

        assert_eq!(compress_old_logs(dir.path()), 1);
        assert!(!old.exists());
        assert!(current.exists());
        assert!(unrelated.exists());

        let gz = fs::File::open(dir.path().join("civic-search.log.2020-01-01.gz")).unwrap();
        let mut content = String::new();
        GzDecoder::new(gz).read_to_string(&mut content).unwrap();
        assert_eq!(content, "old entries");
    }

    #[test]
    fn test_compress_missing_dir() {
        assert_eq!(compress_old_logs(Path::new("/nonexistent/civic-logs")), 0);
    }
}
