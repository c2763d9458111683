use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_REQUESTS: u32 = 100;
const DEFAULT_WINDOW_SECS: u64 = 15 * 60;

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
}

/// Per-client request budget for `/api/*`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            window_secs: DEFAULT_WINDOW_SECS,
        }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Path to the SQLite database
    pub database_path: ConfigValue<PathBuf>,
    /// Port the HTTP server listens on
    pub port: ConfigValue<u16>,
    /// Directory holding the built front-end (index.html and assets)
    pub static_dir: ConfigValue<PathBuf>,
    /// Bearer token for admin routes
    pub admin_secret: ConfigValue<Option<String>>,
    /// Value expected in the `x-sync-secret` header from the POS
    pub sync_secret: ConfigValue<Option<String>>,
    pub rate_limit: RateLimitConfig,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    database_path: Option<PathBuf>,
    port: Option<u16>,
    static_dir: Option<PathBuf>,
    admin_secret: Option<String>,
    sync_secret: Option<String>,
    rate_limit: Option<RateLimitConfig>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    fn load_with_env(
        config_path: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut database_path = ConfigValue::new(
            Self::default_data_dir().join("kruatayai.db"),
            ConfigSource::Default,
        );
        let mut port = ConfigValue::new(DEFAULT_PORT, ConfigSource::Default);
        let mut static_dir = ConfigValue::new(PathBuf::from("public"), ConfigSource::Default);
        let mut admin_secret = ConfigValue::new(None, ConfigSource::Default);
        let mut sync_secret = ConfigValue::new(None, ConfigSource::Default);
        let mut rate_limit = RateLimitConfig::default();
        let mut config_file = None;

        // Try to load from config file
        let path = config_path
            .or_else(|| env("KRUA_CONFIG").map(PathBuf::from))
            .unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(db_path) = file_config.database_path {
                // Resolve relative paths against config file's directory
                let resolved_path = if db_path.is_relative() {
                    path.parent().map(|p| p.join(&db_path)).unwrap_or(db_path)
                } else {
                    db_path
                };
                database_path = ConfigValue::new(resolved_path, ConfigSource::File);
            }
            if let Some(p) = file_config.port {
                port = ConfigValue::new(p, ConfigSource::File);
            }
            if let Some(dir) = file_config.static_dir {
                static_dir = ConfigValue::new(dir, ConfigSource::File);
            }
            if let Some(secret) = file_config.admin_secret {
                admin_secret = ConfigValue::new(Some(secret), ConfigSource::File);
            }
            if let Some(secret) = file_config.sync_secret {
                sync_secret = ConfigValue::new(Some(secret), ConfigSource::File);
            }
            if let Some(limits) = file_config.rate_limit {
                rate_limit = limits;
            }
        }

        // Apply environment variable overrides
        if let Some(db_path) = env("KRUA_DATABASE_PATH") {
            database_path = ConfigValue::new(PathBuf::from(db_path), ConfigSource::Environment);
        }
        if let Some(raw) = env("KRUA_PORT") {
            let p = raw
                .parse()
                .map_err(|_| ConfigError::InvalidEnv("KRUA_PORT", raw.clone()))?;
            port = ConfigValue::new(p, ConfigSource::Environment);
        }
        if let Some(dir) = env("KRUA_STATIC_DIR") {
            static_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Some(secret) = env("KRUA_ADMIN_SECRET") {
            admin_secret = ConfigValue::new(Some(secret), ConfigSource::Environment);
        }
        if let Some(secret) = env("KRUA_SYNC_SECRET") {
            sync_secret = ConfigValue::new(Some(secret), ConfigSource::Environment);
        }

        // An empty secret would match an empty header
        admin_secret.value = admin_secret.value.filter(|s| !s.is_empty());
        sync_secret.value = sync_secret.value.filter(|s| !s.is_empty());

        Ok(Self {
            database_path,
            port,
            static_dir,
            admin_secret,
            sync_secret,
            rate_limit,
            config_file,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/kruatayai/
    /// - macOS: ~/Library/Application Support/kruatayai/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kruatayai")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/kruatayai/
    /// - macOS: ~/Library/Application Support/kruatayai/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kruatayai")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidEnv(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidEnv(var, value) => {
                write!(f, "Invalid value for {}: '{}'", var, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::tempdir;

    fn load(path: PathBuf, vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::load_with_env(Some(path), move |key| vars.get(key).cloned())
    }

    #[test]
    fn test_load_no_file_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let config = load(temp_dir.path().join("nonexistent.yaml"), &[]).unwrap();

        assert!(config
            .database_path
            .value
            .to_string_lossy()
            .contains("kruatayai.db"));
        assert_eq!(config.database_path.source, ConfigSource::Default);
        assert_eq!(config.port.value, 3000);
        assert_eq!(config.static_dir.value, PathBuf::from("public"));
        assert!(config.admin_secret.value.is_none());
        assert!(config.sync_secret.value.is_none());
        assert_eq!(config.rate_limit, RateLimitConfig::default());
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "database_path: data/site.db").unwrap();
        writeln!(file, "port: 8081").unwrap();
        writeln!(file, "admin_secret: letmein").unwrap();
        writeln!(file, "rate_limit:").unwrap();
        writeln!(file, "  max_requests: 5").unwrap();

        let config = load(config_path, &[]).unwrap();

        assert_eq!(
            config.database_path.value,
            temp_dir.path().join("data/site.db")
        );
        assert_eq!(config.database_path.source, ConfigSource::File);
        assert_eq!(config.port.value, 8081);
        assert_eq!(config.admin_secret.value.as_deref(), Some("letmein"));
        assert_eq!(config.admin_secret.source, ConfigSource::File);
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.window_secs, 900);
    }

    #[test]
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "port: 8081").unwrap();
        writeln!(file, "sync_secret: fromfile").unwrap();

        let config = load(
            config_path,
            &[("KRUA_PORT", "9000"), ("KRUA_SYNC_SECRET", "fromenv")],
        )
        .unwrap();

        assert_eq!(config.port.value, 9000);
        assert_eq!(config.port.source, ConfigSource::Environment);
        assert_eq!(config.sync_secret.value.as_deref(), Some("fromenv"));
        assert_eq!(config.sync_secret.source, ConfigSource::Environment);
    }

    #[test]
    fn test_config_path_from_env() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        std::fs::write(&config_path, "static_dir: /srv/www\n").unwrap();

        let path = config_path.to_string_lossy().to_string();
        let config =
            Config::load_with_env(None, |key| (key == "KRUA_CONFIG").then(|| path.clone()))
                .unwrap();

        assert_eq!(config.static_dir.value, PathBuf::from("/srv/www"));
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_empty_secret_is_unset() {
        let temp_dir = tempdir().unwrap();
        let config = load(
            temp_dir.path().join("none.yaml"),
            &[("KRUA_ADMIN_SECRET", "")],
        )
        .unwrap();

        assert!(config.admin_secret.value.is_none());
    }

    #[test]
    fn test_invalid_port_env() {
        let temp_dir = tempdir().unwrap();
        let result = load(temp_dir.path().join("none.yaml"), &[("KRUA_PORT", "http")]);

        assert!(matches!(result, Err(ConfigError::InvalidEnv("KRUA_PORT", _))));
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = load(config_path, &[]);
        assert!(matches!(result, Err(ConfigError::ParseError(_, _))));
    }
}
