use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::db::Backend;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    fn set(&mut self, value: T, source: ConfigSource) {
        self.value = value;
        self.source = source;
    }
}

/// Settings shared by the server, the CLI and the admin tool.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// `sqlite:` or `postgres://` URL
    pub database_url: ConfigValue<String>,
    /// Server the CLI talks to
    pub server_url: ConfigValue<String>,
    /// Port the server listens on
    pub port: ConfigValue<u16>,
    /// Where the CLI keeps its session file
    pub data_dir: ConfigValue<PathBuf>,
    /// Lifetime of server-issued bearer tokens
    pub session_ttl_hours: ConfigValue<i64>,
    /// Default tracing filter when RUST_LOG is unset
    pub log_filter: ConfigValue<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    database_url: Option<String>,
    server_url: Option<String>,
    port: Option<u16>,
    data_dir: Option<PathBuf>,
    session_ttl_hours: Option<i64>,
    log_filter: Option<String>,
}

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
pub const DEFAULT_LOG_FILTER: &str = "intradash=info,tower_http=info";

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`] with the environment supplied by `env`.
    pub fn load_with_env(
        config_path: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut database_url: Option<ConfigValue<String>> = None;
        let mut server_url =
            ConfigValue::new(DEFAULT_SERVER_URL.to_string(), ConfigSource::Default);
        let mut port = ConfigValue::new(DEFAULT_PORT, ConfigSource::Default);
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut session_ttl_hours =
            ConfigValue::new(DEFAULT_SESSION_TTL_HOURS, ConfigSource::Default);
        let mut log_filter = ConfigValue::new(DEFAULT_LOG_FILTER.to_string(), ConfigSource::Default);
        let mut config_file = None;

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(url) = file_config.database_url {
                database_url = Some(ConfigValue::new(url, ConfigSource::File));
            }
            if let Some(url) = file_config.server_url {
                server_url.set(url, ConfigSource::File);
            }
            if let Some(p) = file_config.port {
                port.set(p, ConfigSource::File);
            }
            if let Some(dir) = file_config.data_dir {
                // Relative paths are relative to the config file
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir.set(resolved, ConfigSource::File);
            }
            if let Some(hours) = file_config.session_ttl_hours {
                session_ttl_hours.set(hours, ConfigSource::File);
            }
            if let Some(filter) = file_config.log_filter {
                log_filter.set(filter, ConfigSource::File);
            }
        }

        if let Some(url) = env("INTRADASH_DATABASE_URL") {
            database_url = Some(ConfigValue::new(url, ConfigSource::Environment));
        }
        if let Some(url) = env("INTRADASH_SERVER_URL") {
            server_url.set(url, ConfigSource::Environment);
        }
        if let Some(raw) = env("INTRADASH_PORT") {
            let p = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "INTRADASH_PORT",
                value: raw.clone(),
            })?;
            port.set(p, ConfigSource::Environment);
        }
        if let Some(dir) = env("INTRADASH_DATA_DIR") {
            data_dir.set(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Some(raw) = env("INTRADASH_SESSION_TTL_HOURS") {
            let hours = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "INTRADASH_SESSION_TTL_HOURS",
                value: raw.clone(),
            })?;
            session_ttl_hours.set(hours, ConfigSource::Environment);
        }
        if let Some(filter) = env("INTRADASH_LOG") {
            log_filter.set(filter, ConfigSource::Environment);
        }

        let database_url = database_url.unwrap_or_else(|| {
            ConfigValue::new(
                Self::default_database_url(&data_dir.value),
                ConfigSource::Default,
            )
        });
        if Backend::from_url(&database_url.value).is_none() {
            return Err(ConfigError::UnsupportedDatabase(database_url.value));
        }
        if session_ttl_hours.value <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "session_ttl_hours",
                value: session_ttl_hours.value.to_string(),
            });
        }

        Ok(Self {
            database_url,
            server_url,
            port,
            data_dir,
            session_ttl_hours,
            log_filter,
            config_file,
        })
    }

    /// Embedded SQLite file inside `data_dir`.
    pub fn default_database_url(data_dir: &std::path::Path) -> String {
        format!("sqlite:{}?mode=rwc", data_dir.join("intradash.db").display())
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/intradash/
    /// - macOS: ~/Library/Application Support/intradash/
    /// - Windows: %APPDATA%/intradash/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("intradash")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/intradash/
    /// - macOS: ~/Library/Application Support/intradash/
    /// - Windows: %APPDATA%/intradash/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("intradash")
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {1}", .0.display())]
    ReadError(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{}': {1}", .0.display())]
    ParseError(PathBuf, #[source] serde_yaml::Error),

    #[error("Unsupported database URL '{0}'. Use sqlite:<path> or postgres://...")]
    UnsupportedDatabase(String),

    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::tempdir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load_with_env(Some(config_path), no_env).unwrap();
        assert!(config.database_url.value.starts_with("sqlite:"));
        assert!(config.database_url.value.contains("intradash.db"));
        assert_eq!(config.database_url.source, ConfigSource::Default);
        assert_eq!(config.server_url.value, DEFAULT_SERVER_URL);
        assert_eq!(config.port.value, 8080);
        assert_eq!(config.session_ttl_hours.value, 24);
        assert_eq!(config.log_filter.value, "intradash=info,tower_http=info");
        assert_eq!(config.config_file, None);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "database_url: postgres://intranet@db/intranet").unwrap();
        writeln!(file, "port: 9000").unwrap();
        writeln!(file, "data_dir: state").unwrap();

        let config = Config::load_with_env(Some(config_path.clone()), no_env).unwrap();
        assert_eq!(config.database_url.value, "postgres://intranet@db/intranet");
        assert_eq!(config.database_url.source, ConfigSource::File);
        assert_eq!(config.port.value, 9000);
        assert_eq!(config.port.source, ConfigSource::File);
        assert_eq!(config.data_dir.value, temp_dir.path().join("state"));
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_default_database_follows_data_dir() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "data_dir: /srv/intranet\n").unwrap();

        let config = Config::load_with_env(Some(config_path), no_env).unwrap();
        assert_eq!(
            config.database_url.value,
            "sqlite:/srv/intranet/intradash.db?mode=rwc"
        );
    }

    #[test]
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "server_url: http://fromfile:8080\nport: 9000\n").unwrap();

        let env: HashMap<&str, &str> = [
            ("INTRADASH_SERVER_URL", "http://fromenv:8080"),
            ("INTRADASH_PORT", "7000"),
        ]
        .into_iter()
        .collect();

        let config = Config::load_with_env(Some(config_path), |k| {
            env.get(k).map(|v| v.to_string())
        })
        .unwrap();
        assert_eq!(config.server_url.value, "http://fromenv:8080");
        assert_eq!(config.server_url.source, ConfigSource::Environment);
        assert_eq!(config.port.value, 7000);
        assert_eq!(config.port.source, ConfigSource::Environment);
    }

    #[test]
    fn test_bad_env_port() {
        let temp_dir = tempdir().unwrap();
        let result = Config::load_with_env(Some(temp_dir.path().join("none.yaml")), |k| {
            (k == "INTRADASH_PORT").then(|| "eighty".to_string())
        });

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { key: "INTRADASH_PORT", .. })
        ));
    }

    #[test]
    fn test_unsupported_database() {
        let temp_dir = tempdir().unwrap();
        let result = Config::load_with_env(Some(temp_dir.path().join("none.yaml")), |k| {
            (k == "INTRADASH_DATABASE_URL").then(|| "mysql://db/intranet".to_string())
        });

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Unsupported database URL"));
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load_with_env(Some(config_path), no_env);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to parse config file"));
    }
}
