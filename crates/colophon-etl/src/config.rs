use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for colophon.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (COLOPHON_* prefix)
/// 3. Config file (~/.config/colophon/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite database.
    ///
    /// Can be set via:
    /// - CLI: --db /path/to/db
    /// - ENV: COLOPHON_DATABASE_PATH
    /// - Config: database_path = "/path/to/db"
    /// - Default: ~/.local/share/colophon/colophon.db
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,

    /// Root of the statically served public directory.
    ///
    /// Cover images are cached under `<public_dir>/covers/`.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    /// Cache directory for the downloaded sentence embedding model.
    #[serde(default = "default_model_cache_dir")]
    pub model_cache_dir: PathBuf,

    /// Language assigned to parsed records without an edition suffix.
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Format assigned to every parsed record.
    #[serde(default = "default_format")]
    pub default_format: String,

    /// Marker token that opens an excerpt block in the corpus export.
    ///
    /// Matched case-insensitively anywhere in a line.
    #[serde(default = "default_excerpt_marker")]
    pub excerpt_marker: String,

    /// Lines equal to one of these tokens are ignored by the parser.
    #[serde(default = "default_noise_tokens")]
    pub noise_tokens: Vec<String>,

    /// Delay between consecutive metadata provider calls, in milliseconds.
    #[serde(default = "default_provider_delay_ms")]
    pub provider_delay_ms: u64,

    /// Maximum number of records enriched in a single run.
    #[serde(default = "default_enrich_batch_size")]
    pub enrich_batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
            public_dir: default_public_dir(),
            model_cache_dir: default_model_cache_dir(),
            default_language: default_language(),
            default_format: default_format(),
            excerpt_marker: default_excerpt_marker(),
            noise_tokens: default_noise_tokens(),
            provider_delay_ms: default_provider_delay_ms(),
            enrich_batch_size: default_enrich_batch_size(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/colophon/config.toml
    /// Reads environment variables with COLOPHON_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if a numeric environment override is not a valid number.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut config = if config_path.exists() {
            let raw = std::fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read config file {}", config_path.display())
            })?;
            toml::from_str(&raw).context("Failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration with custom database path.
    ///
    /// This is used when the --db CLI flag is provided.
    pub fn load_with_db_path(db_path: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.database_path = db_path;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var("COLOPHON_DATABASE_PATH") {
            self.database_path = PathBuf::from(value);
        }
        if let Ok(value) = std::env::var("COLOPHON_PUBLIC_DIR") {
            self.public_dir = PathBuf::from(value);
        }
        if let Ok(value) = std::env::var("COLOPHON_MODEL_CACHE_DIR") {
            self.model_cache_dir = PathBuf::from(value);
        }
        if let Ok(value) = std::env::var("COLOPHON_DEFAULT_LANGUAGE") {
            self.default_language = value;
        }
        if let Ok(value) = std::env::var("COLOPHON_DEFAULT_FORMAT") {
            self.default_format = value;
        }
        if let Ok(value) = std::env::var("COLOPHON_EXCERPT_MARKER") {
            self.excerpt_marker = value;
        }
        if let Ok(value) = std::env::var("COLOPHON_PROVIDER_DELAY_MS") {
            self.provider_delay_ms = value
                .parse()
                .context("COLOPHON_PROVIDER_DELAY_MS must be an integer")?;
        }
        if let Ok(value) = std::env::var("COLOPHON_ENRICH_BATCH_SIZE") {
            self.enrich_batch_size = value
                .parse()
                .context("COLOPHON_ENRICH_BATCH_SIZE must be an integer")?;
        }
        Ok(())
    }
}

/// Get the default database path.
///
/// Returns: ~/.local/share/colophon/colophon.db (or platform equivalent)
fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("colophon")
        .join("colophon.db")
}

/// Get the default public directory.
fn default_public_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("colophon")
        .join("public")
}

/// Get the default model cache directory.
fn default_model_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("colophon")
        .join("models")
}

fn default_language() -> String {
    "Italian".to_string()
}

fn default_format() -> String {
    "Ebook".to_string()
}

fn default_excerpt_marker() -> String {
    "ESTRATTO".to_string()
}

fn default_noise_tokens() -> Vec<String> {
    vec!["Prime Reading".to_string()]
}

const fn default_provider_delay_ms() -> u64 {
    1200
}

const fn default_enrich_batch_size() -> usize {
    100
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/colophon/config.toml
/// - macOS: ~/Library/Application Support/colophon/config.toml
/// - Windows: %APPDATA%\colophon\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("colophon")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Colophon Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (COLOPHON_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Path to the SQLite database
#
# Can also be set via:
# - CLI: colophon --db /custom/path.db status
# - Environment: COLOPHON_DATABASE_PATH=/custom/path.db
#
# Default: Platform-specific data directory
#database_path = "/path/to/custom/colophon.db"

# Root of the statically served public directory; cover images are
# cached under <public_dir>/covers/
#
# Default: Platform-specific data directory
#public_dir = "/path/to/public"

# Cache directory for the downloaded sentence embedding model
#
# Default: Platform-specific cache directory
#model_cache_dir = "/path/to/model/cache"

# Language assigned to parsed records without an edition suffix
#default_language = "Italian"

# Format assigned to every parsed record
#default_format = "Ebook"

# Marker token that opens an excerpt block in the corpus export
# (matched case-insensitively anywhere in a line)
#excerpt_marker = "ESTRATTO"

# Lines equal to one of these tokens are ignored by the parser
#noise_tokens = ["Prime Reading"]

# Delay between consecutive metadata provider calls, in milliseconds
#provider_delay_ms = 1200

# Maximum number of records enriched in a single run
#enrich_batch_size = 100
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    // Create parent directory
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    // Write default config
    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.database_path.as_os_str().is_empty());
        assert_eq!(config.default_language, "Italian");
        assert_eq!(config.default_format, "Ebook");
        assert_eq!(config.excerpt_marker, "ESTRATTO");
        assert_eq!(config.noise_tokens, vec!["Prime Reading".to_string()]);
        assert_eq!(config.provider_delay_ms, 1200);
        assert_eq!(config.enrich_batch_size, 100);
    }

    #[test]
    fn test_config_load() {
        // Should not fail even if config file doesn't exist
        let result = Config::load();
        assert!(result.is_ok());
    }

    #[test]
    fn test_config_with_custom_db_path() {
        let custom_path = PathBuf::from("/tmp/test.db");
        let config = Config::load_with_db_path(custom_path.clone());
        assert!(config.is_ok());
        assert_eq!(config.unwrap().database_path, custom_path);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str("default_language = \"English\"").unwrap();
        assert_eq!(config.default_language, "English");
        assert_eq!(config.default_format, "Ebook");
        assert_eq!(config.provider_delay_ms, 1200);
    }

    #[test]
    fn test_env_override_applies() {
        std::env::set_var("COLOPHON_DEFAULT_LANGUAGE", "English");
        let mut config = Config::default();
        let result = config.apply_env_overrides();
        std::env::remove_var("COLOPHON_DEFAULT_LANGUAGE");
        assert!(result.is_ok());
        assert_eq!(config.default_language, "English");
    }

    #[test]
    fn test_example_config_parses() {
        // Every commented-out value in the example must stay valid TOML.
        let config: std::result::Result<Config, _> = toml::from_str(example_config());
        assert!(config.is_ok());
    }
}
