//! Bootstrap configuration loading
//!
//! Settings resolve in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is not an error: defaults apply. A config file that
//! exists but does not parse is reported as [`Error::Config`].

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "VOXLINE_CONFIG";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "VOXLINE_DATA_DIR";

/// Environment variable overriding the corpus locator
pub const CORPUS_ENV: &str = "VOXLINE_CORPUS";

/// Placeholder replaced by the audio locator in `player_args`
pub const LOCATOR_PLACEHOLDER: &str = "{locator}";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Corpus locator (path, `file://` or `http(s)://` URL)
    pub corpus: Option<String>,

    /// Directory holding persisted state and the corpus cache
    pub data_dir: Option<PathBuf>,

    /// Audio playback settings
    pub playback: PlaybackConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Audio playback settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// External player used by the streaming playback tiers
    pub player: String,

    /// Player arguments; [`LOCATOR_PLACEHOLDER`] is replaced by the locator
    pub player_args: Vec<String>,

    /// How long a freshly started player must survive before play counts as
    /// started (milliseconds)
    pub settle_ms: u64,

    /// Output device name for the decoded-buffer tier (None = default device)
    pub device: Option<String>,

    /// Timeout for fetching audio bytes (milliseconds)
    pub fetch_timeout_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            player: "ffplay".to_string(),
            player_args: vec![
                "-nodisp".to_string(),
                "-autoexit".to_string(),
                "-loglevel".to_string(),
                "error".to_string(),
                LOCATOR_PLACEHOLDER.to_string(),
            ],
            settle_ms: 400,
            device: None,
            fetch_timeout_ms: 10_000,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse a config file that must exist
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("{} ({})", e, path.display())))
    }

    /// Parse config TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))
    }

    /// Locate and load the config file, falling back to defaults.
    ///
    /// Search order: `explicit` argument, [`CONFIG_ENV`], then
    /// `<config_dir>/voxline/config.toml`. An explicitly named file must exist;
    /// a missing default file silently yields defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            info!("Loading config from {}", path.display());
            return Self::load(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            info!("Loading config from {} ({})", path.display(), CONFIG_ENV);
            return Self::load(&path);
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                info!("Loading config from {}", path.display());
                Self::load(&path)
            }
            _ => {
                debug!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Default config file location for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("voxline").join("config.toml"))
}

/// OS-dependent default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("voxline"))
        .unwrap_or_else(|| PathBuf::from("./voxline_data"))
}

/// Resolve the data directory: CLI, then [`DATA_DIR_ENV`], then TOML, then
/// [`default_data_dir`].
pub fn resolve_data_dir(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    if let Some(path) = &config.data_dir {
        return path.clone();
    }

    default_data_dir()
}

/// Resolve the corpus locator: CLI, then [`CORPUS_ENV`], then TOML.
///
/// # Errors
/// [`Error::Config`] if no source names a corpus.
pub fn resolve_corpus(cli_arg: Option<&str>, config: &TomlConfig) -> Result<String> {
    if let Some(locator) = cli_arg {
        return Ok(locator.to_string());
    }

    if let Ok(locator) = std::env::var(CORPUS_ENV) {
        return Ok(locator);
    }

    config.corpus.clone().ok_or_else(|| {
        Error::Config(format!(
            "No corpus configured (use --corpus, {} or `corpus` in config.toml)",
            CORPUS_ENV
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert!(config.corpus.is_none());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.playback.player, "ffplay");
        assert!(config
            .playback
            .player_args
            .iter()
            .any(|a| a == LOCATOR_PLACEHOLDER));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TomlConfig::parse(
            r#"
            corpus = "https://cdn.example/voice_index.json"

            [playback]
            player = "mpv"
            "#,
        )
        .unwrap();

        assert_eq!(config.corpus.as_deref(), Some("https://cdn.example/voice_index.json"));
        assert_eq!(config.playback.player, "mpv");
        assert_eq!(config.playback.settle_ms, 400);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        assert!(matches!(TomlConfig::parse("corpus = ["), Err(Error::Config(_))));
    }
}
