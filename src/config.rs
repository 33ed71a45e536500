//! Configuration file parser for `feedloom.toml`.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are silently ignored by serde (with `deny_unknown_fields` off),
//! though we log a warning when the file contains potential typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// Well-formed TOML with a value that cannot be used.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level build configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of sources normalized at the same time. Must be at least 1.
    pub concurrency: usize,

    /// Pretty-print the JSON output.
    pub pretty: bool,

    /// Feed sources, in output order.
    pub sources: Vec<SourceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: 4,
            pretty: false,
            sources: Vec::new(),
        }
    }
}

/// One feed source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceConfig {
    /// Local file holding the raw feed document. Relative paths are resolved
    /// against the directory of the config file.
    pub path: PathBuf,

    /// Where the feed is published; becomes `feed_url` of the output.
    #[serde(default)]
    pub url: Option<String>,
}

impl SourceConfig {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            url: None,
        }
    }

    /// Label used in logs and error reports.
    pub fn label(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => self.path.display().to_string(),
        }
    }
}

impl Config {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Zero concurrency → `Err(ConfigError::Invalid)`
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // SEC-014: Check file size before reading to prevent memory exhaustion
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = ["concurrency", "pretty", "sources"];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let mut config: Config = toml::from_str(&content)?;
        if config.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "concurrency must be at least 1".to_string(),
            ));
        }

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for source in &mut config.sources {
            if source.path.is_relative() {
                source.path = base.join(&source.path);
            }
        }

        tracing::info!(
            path = %path.display(),
            sources = config.sources.len(),
            "Loaded configuration"
        );
        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, content: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("feedloom.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.concurrency, 4);
        assert!(!config.pretty);
        assert!(config.sources.is_empty());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/feedloom_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_empty_file_returns_default() {
        let (dir, path) = write_config("feedloom_config_test_empty", "   \n  \n");

        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let content = r#"
concurrency = 8
pretty = true

[[sources]]
path = "/var/feeds/blog.xml"
url = "https://blog.example.com/feed.xml"

[[sources]]
path = "/var/feeds/news.xml"
"#;
        let (dir, path) = write_config("feedloom_config_test_full", content);

        let config = Config::load(&path).unwrap();
        assert_eq!(config.concurrency, 8);
        assert!(config.pretty);
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[0].path, PathBuf::from("/var/feeds/blog.xml"));
        assert_eq!(
            config.sources[0].url.as_deref(),
            Some("https://blog.example.com/feed.xml")
        );
        assert_eq!(config.sources[1].url, None);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_relative_source_paths_resolve_against_config_dir() {
        let (dir, path) = write_config(
            "feedloom_config_test_relative",
            "[[sources]]\npath = \"feeds/a.xml\"\n",
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.sources[0].path, dir.join("feeds/a.xml"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_source_without_path_is_parse_error() {
        let (dir, path) = write_config(
            "feedloom_config_test_no_path",
            "[[sources]]\nurl = \"https://a.example/feed\"\n",
        );

        let result = Config::load(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let (dir, path) = write_config("feedloom_config_test_zero", "concurrency = 0\n");

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("concurrency"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let (dir, path) = write_config("feedloom_config_test_invalid", "this is not [valid toml");

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let (dir, path) = write_config(
            "feedloom_config_test_unknown",
            "pretty = true\ntotally_fake_key = \"x\"\n",
        );

        let config = Config::load(&path).unwrap();
        assert!(config.pretty);

        std::fs::remove_dir_all(&dir).ok();
    }

    // SEC-014: File size limit
    #[test]
    fn test_too_large_file_rejected() {
        let (dir, path) = write_config("feedloom_config_test_too_large", &"a".repeat(1_048_577));

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_source_label_prefers_url() {
        let mut source = SourceConfig::from_path("/tmp/a.xml");
        assert_eq!(source.label(), "/tmp/a.xml");

        source.url = Some("https://a.example/feed".to_string());
        assert_eq!(source.label(), "https://a.example/feed");
    }
}
