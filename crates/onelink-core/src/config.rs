//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/onelink/config.toml)
//! 3. Environment variables (ONELINK_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::storage::{slot_file_name, STORAGE_KEY};

/// Environment variable prefix
const ENV_PREFIX: &str = "ONELINK";

/// Default metadata service queried for link previews
pub const DEFAULT_PREVIEW_ENDPOINT: &str = "https://api.microlink.io/";

/// Default favicon service used when a preview cannot be fetched
pub const DEFAULT_FAVICON_ENDPOINT: &str = "https://www.google.com/s2/favicons";

/// Default preview request timeout in seconds
pub const DEFAULT_PREVIEW_TIMEOUT_SECS: u64 = 10;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the state file
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Metadata service for link previews
    #[serde(default = "default_preview_endpoint")]
    pub preview_endpoint: String,

    /// Favicon service for fallback previews
    #[serde(default = "default_favicon_endpoint")]
    pub favicon_endpoint: String,

    /// Preview request timeout
    #[serde(default = "default_preview_timeout")]
    pub preview_timeout_secs: u64,

    /// Where exported pages are written (defaults to the current directory)
    #[serde(default)]
    pub export_dir: Option<PathBuf>,

    /// Log file for the TUI (defaults to {data_dir}/debug.log)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            preview_endpoint: default_preview_endpoint(),
            favicon_endpoint: default_favicon_endpoint(),
            preview_timeout_secs: DEFAULT_PREVIEW_TIMEOUT_SECS,
            export_dir: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (ONELINK_DATA_DIR, ONELINK_PREVIEW_ENDPOINT, ...)
    /// 2. Config file (~/.config/onelink/config.toml or ONELINK_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_PREVIEW_ENDPOINT", ENV_PREFIX)) {
            if !val.is_empty() {
                self.preview_endpoint = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_FAVICON_ENDPOINT", ENV_PREFIX)) {
            if !val.is_empty() {
                self.favicon_endpoint = val;
            }
        }

        // Unparseable values are ignored
        if let Ok(val) = std::env::var(format!("{}_PREVIEW_TIMEOUT", ENV_PREFIX)) {
            if let Ok(secs) = val.trim().parse() {
                self.preview_timeout_secs = secs;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_EXPORT_DIR", ENV_PREFIX)) {
            self.export_dir = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with ONELINK_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("onelink")
            .join("config.toml")
    }

    /// Get the path of the state file for the current storage key
    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join(slot_file_name(STORAGE_KEY))
    }

    /// Get the TUI log file path
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }

    /// Get the directory exports are written to
    pub fn export_path(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("onelink")
}

fn default_preview_endpoint() -> String {
    DEFAULT_PREVIEW_ENDPOINT.to_string()
}

fn default_favicon_endpoint() -> String {
    DEFAULT_FAVICON_ENDPOINT.to_string()
}

fn default_preview_timeout() -> u64 {
    DEFAULT_PREVIEW_TIMEOUT_SECS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Serializes every test that reads or writes ONELINK_* variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "ONELINK_DATA_DIR",
        "ONELINK_PREVIEW_ENDPOINT",
        "ONELINK_FAVICON_ENDPOINT",
        "ONELINK_PREVIEW_TIMEOUT",
        "ONELINK_EXPORT_DIR",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.preview_endpoint, DEFAULT_PREVIEW_ENDPOINT);
        assert_eq!(config.favicon_endpoint, DEFAULT_FAVICON_ENDPOINT);
        assert_eq!(config.preview_timeout_secs, 10);
        assert!(config.export_dir.is_none());
        assert!(config.data_dir.ends_with("onelink"));
    }

    #[test]
    fn test_file_paths() {
        let config = Config::default();
        assert!(config.state_path().ends_with("one-link.v1.json"));
        assert!(config.log_path().ends_with("debug.log"));
        assert_eq!(config.export_path(), PathBuf::from("."));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("ONELINK_DATA_DIR", "/tmp/onelink-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/onelink-test"));
    }

    #[test]
    fn test_env_override_endpoints() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("ONELINK_PREVIEW_ENDPOINT", "http://localhost:9000/");
        env::set_var("ONELINK_FAVICON_ENDPOINT", "http://localhost:9001/icons");
        config.apply_env_overrides();

        assert_eq!(config.preview_endpoint, "http://localhost:9000/");
        assert_eq!(config.favicon_endpoint, "http://localhost:9001/icons");

        // Empty value keeps the current endpoint
        env::set_var("ONELINK_PREVIEW_ENDPOINT", "");
        config.apply_env_overrides();
        assert_eq!(config.preview_endpoint, "http://localhost:9000/");
    }

    #[test]
    fn test_env_override_timeout() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("ONELINK_PREVIEW_TIMEOUT", "3");
        config.apply_env_overrides();
        assert_eq!(config.preview_timeout_secs, 3);

        env::set_var("ONELINK_PREVIEW_TIMEOUT", "soon");
        config.apply_env_overrides();
        assert_eq!(config.preview_timeout_secs, 3);
    }

    #[test]
    fn test_env_override_export_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("ONELINK_EXPORT_DIR", "/tmp/exports");
        config.apply_env_overrides();
        assert_eq!(config.export_dir, Some(PathBuf::from("/tmp/exports")));

        // Empty string clears it
        env::set_var("ONELINK_EXPORT_DIR", "");
        config.apply_env_overrides();
        assert!(config.export_dir.is_none());
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/onelink"),
            preview_endpoint: "http://preview.local/".to_string(),
            favicon_endpoint: DEFAULT_FAVICON_ENDPOINT.to_string(),
            preview_timeout_secs: 5,
            export_dir: Some(PathBuf::from("/exports")),
            log_file: None,
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("preview_endpoint"));
        assert!(toml_str.contains("export_dir"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.preview_endpoint, config.preview_endpoint);
        assert_eq!(parsed.preview_timeout_secs, 5);
        assert_eq!(parsed.export_dir, config.export_dir);
    }

    #[test]
    fn test_load_from_str_fills_defaults() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config::load_from_str(r#"data_dir = "/custom/data""#).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.preview_endpoint, DEFAULT_PREVIEW_ENDPOINT);
        assert_eq!(config.preview_timeout_secs, DEFAULT_PREVIEW_TIMEOUT_SECS);
    }

    #[test]
    fn test_save_and_load_from_path() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            data_dir: temp_dir.path().join("data"),
            preview_timeout_secs: 7,
            ..Config::default()
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.preview_timeout_secs, 7);
        assert!(loaded.data_dir.exists());
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        env::set_var("ONELINK_DATA_DIR", temp_dir.path());

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.preview_endpoint, DEFAULT_PREVIEW_ENDPOINT);
        assert_eq!(config.data_dir, temp_dir.path());
    }
}
