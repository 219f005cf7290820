use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::engines::FallbackConfig;
use crate::core::logging::LoggingConfig;
use crate::core::preprocess::{CorrectionConfig, PreprocessConfig, SynonymConfig};
use crate::core::search::{CacheConfig, SearchConfig};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    /// Fallback chain timing
    pub engines: FallbackConfig,
    pub cache: CacheConfig,
    pub correction: CorrectionConfig,
    pub synonyms: SynonymConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `~/.config/civic-search/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        let loaded = Self::load_from(&config_path);
        let (level, message) = Self::describe_load(&config_path, &loaded);
        log::log!(level, "{}", message);
        loaded.unwrap_or_default()
    }

    /// Log level and message reporting the outcome of loading `path`.
    ///
    /// Lets callers defer the report until logging is installed.
    pub fn describe_load(path: &Path, loaded: &Result<Self, ConfigError>) -> (log::Level, String) {
        match loaded {
            Ok(_) => (log::Level::Info, format!("Loaded config from {}", path.display())),
            Err(ConfigError::Read { .. }) => (
                log::Level::Debug,
                format!("No config file at {}, using defaults", path.display()),
            ),
            Err(e) => (
                log::Level::Warn,
                format!("{} at {}, using defaults", e, path.display()),
            ),
        }
    }

    /// Load from an explicit path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Correction and synonym sections combined for the correction engine
    pub fn preprocess(&self) -> PreprocessConfig {
        PreprocessConfig {
            correction: self.correction.clone(),
            synonyms: self.synonyms.clone(),
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("civic-search").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.search.min_query_length, 2);
        assert_eq!(config.search.max_query_length, 500);
        assert_eq!(config.engines.cooldown_ms, 300_000);
        assert_eq!(config.cache.ttl_seconds, 300);
        assert!(config.correction.enabled);
        assert_eq!(config.synonyms.max_results, 10);
    }

    #[test]
    fn test_config_load_missing_file() {
        // Should return defaults without panicking
        let config = AppConfig::load();
        assert!(config.search.max_limit > 0);
    }

    #[test]
    fn test_describe_load_outcomes() {
        let path = Path::new("/nonexistent/civic-search/config.toml");

        let (level, message) = AppConfig::describe_load(path, &Ok(AppConfig::default()));
        assert_eq!(level, log::Level::Info);
        assert!(message.starts_with("Loaded config from"));

        let missing = AppConfig::load_from(path);
        let (level, message) = AppConfig::describe_load(path, &missing);
        assert_eq!(level, log::Level::Debug);
        assert!(message.contains("using defaults"));

        let broken = AppConfig::from_toml_str("[engines\nengine_timeout_ms = 1");
        let (level, message) = AppConfig::describe_load(path, &broken);
        assert_eq!(level, log::Level::Warn);
        assert!(message.starts_with("Failed to parse config"));
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml_str(
            r#"
            [engines]
            engine_timeout_ms = 250

            [cache]
            enabled = false

            [correction]
            protected_words = ["hb"]

            [logging]
            level = "debug"
            console = false
            "#,
        )
        .unwrap();

        assert_eq!(config.engines.engine_timeout_ms, 250);
        assert_eq!(config.engines.cooldown_ms, 300_000);
        assert!(!config.cache.enabled);
        assert_eq!(config.preprocess().correction.protected_words, vec!["hb".to_string()]);
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.console);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            AppConfig::from_toml_str("[search\nmax_limit = 5"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[search]\nmax_suggestions = 2").unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.search.max_suggestions, 2);

        assert!(matches!(
            AppConfig::load_from(Path::new("/nonexistent/civic.toml")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = AppConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized = AppConfig::from_toml_str(&serialized).unwrap();
        assert_eq!(deserialized.cache, config.cache);
        assert_eq!(deserialized.logging, config.logging);
    }
}
