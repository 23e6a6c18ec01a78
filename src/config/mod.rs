//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_STORE_URL: &str = "BEOPARDY_STORE_URL";
pub const ENV_STORE_KEY: &str = "BEOPARDY_STORE_KEY";
pub const ENV_ADMIN_TOKEN: &str = "BEOPARDY_ADMIN_TOKEN";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Where rows are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// JSONL files under `data_dir`
    #[default]
    Jsonl,
    /// Hosted database over PostgREST
    Postgrest,
}

/// Store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Project URL, e.g. "https://xyz.supabase.co"
    #[serde(default)]
    pub url: Option<String>,

    /// Project API key
    #[serde(default)]
    pub api_key: Option<String>,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: None,
            api_key: None,
            timeout_seconds: default_timeout(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Admin surface configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Bearer token for `/api/admin`; admin is disabled when unset
    #[serde(default)]
    pub token: Option<String>,
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub admin: AdminConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file if present, then apply environment overrides.
    /// A missing file means defaults.
    ///
    /// Runs before logging is set up, so callers report the fallback.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            AppConfig::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override secrets from the environment. Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = get(ENV_STORE_URL) {
            self.store.url = Some(url);
        }
        if let Some(key) = get(ENV_STORE_KEY) {
            self.store.api_key = Some(key);
        }
        if let Some(token) = get(ENV_ADMIN_TOKEN) {
            self.admin.token = Some(token);
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Store timeout must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.store.backend == StoreBackend::Postgrest {
            let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
            if blank(&self.store.url) {
                return Err(ConfigError::ValidationError(format!(
                    "The postgrest backend needs store.url (or {})",
                    ENV_STORE_URL
                )));
            }
            if blank(&self.store.api_key) {
                return Err(ConfigError::ValidationError(format!(
                    "The postgrest backend needs store.api_key (or {})",
                    ENV_STORE_KEY
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.store.backend, StoreBackend::Jsonl);
        assert_eq!(config.store.timeout_seconds, 30);
        assert_eq!(config.server.port, 8080);
        assert!(config.admin.token.is_none());
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_timeout() {
        let mut config = AppConfig::default();
        config.store.timeout_seconds = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_postgrest_needs_url_and_key() {
        let mut config = AppConfig::default();
        config.store.backend = StoreBackend::Postgrest;
        assert!(config.validate().is_err());

        config.store.url = Some("https://xyz.supabase.co".to_string());
        assert!(config.validate().is_err());

        config.store.api_key = Some("anon".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            data_dir = "/srv/beopardy"

            [server]
            port = 9000

            [store]
            backend = "postgrest"
            url = "https://xyz.supabase.co"
            api_key = "anon"

            [admin]
            token = "s3cret"
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/beopardy"));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.store.backend, StoreBackend::Postgrest);
        assert_eq!(config.store.timeout_seconds, 30);
        assert_eq!(config.admin.token.as_deref(), Some("s3cret"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_STORE_URL, "https://env.supabase.co"),
            (ENV_STORE_KEY, "  "),
            (ENV_ADMIN_TOKEN, "from-env"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.store.api_key = Some("from-file".to_string());
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.store.url.as_deref(), Some("https://env.supabase.co"));
        assert_eq!(config.store.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.admin.token.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_missing_file_means_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        assert!(matches!(AppConfig::from_file(&path), Err(ConfigError::ReadError(_))));

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.backend, StoreBackend::Jsonl);

        std::fs::write(&path, "log_level = \"debug\"\n").unwrap();
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[server\nport = 1").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        // Should be parseable
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.data_dir, parsed.data_dir);
        assert_eq!(config.store.backend, parsed.store.backend);
    }
}
