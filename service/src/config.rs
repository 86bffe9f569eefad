use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Application configuration loaded from multiple sources.
///
/// Configuration is loaded in priority order (lowest to highest):
/// 1. Struct defaults
/// 2. config.yaml file (if exists)
/// 3. Environment variables with LEDGER_ prefix (always wins)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which [`DocumentCollection`](crate::store::DocumentCollection) backs the repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local, lost on exit.
    Memory,
    #[default]
    Mongo,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// MongoDB connection string.
    #[serde(default = "default_uri")]
    pub uri: String,

    /// Database holding the `accounts` collection.
    #[serde(default = "default_database")]
    pub database: String,

    /// Server selection and connect timeout, in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Total time to keep retrying the initial connection, in seconds.
    #[serde(default = "default_retry_deadline_secs")]
    pub retry_deadline_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level filter (debug, info, warn, error) or a full `EnvFilter` directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

fn default_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database() -> String {
    "ledgerline".to_string()
}

// These functions cannot be const because serde uses function pointers for defaults
#[allow(clippy::missing_const_for_fn)]
fn default_connect_timeout_ms() -> u64 {
    3_000
}

#[allow(clippy::missing_const_for_fn)]
fn default_retry_deadline_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            uri: default_uri(),
            database: default_database(),
            connect_timeout_ms: default_connect_timeout_ms(),
            retry_deadline_secs: default_retry_deadline_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

/// Characters MongoDB does not allow in database names.
const FORBIDDEN_DATABASE_CHARS: &[char] = &['/', '\\', '.', '"', '$', ' '];

impl Config {
    /// Load configuration from defaults, `config.yaml`, and `LEDGER_*` variables.
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config.yaml")
    }

    /// Load configuration with a custom YAML file path.
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load_from(yaml_path: &str) -> Result<Self, ConfigError> {
        let config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file(yaml_path))
            .merge(Env::prefixed("LEDGER_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let store = &self.store;

        if store.backend == StoreBackend::Mongo
            && !store.uri.starts_with("mongodb://")
            && !store.uri.starts_with("mongodb+srv://")
        {
            return Err(ConfigError::Validation(format!(
                "store.uri must start with mongodb:// or mongodb+srv://, got: '{}'",
                store.uri
            )));
        }

        if store.database.is_empty() {
            return Err(ConfigError::Validation(
                "store.database is required. Set LEDGER_STORE__DATABASE or configure in config.yaml.".into(),
            ));
        }

        if store.database.contains(FORBIDDEN_DATABASE_CHARS) {
            return Err(ConfigError::Validation(format!(
                "store.database contains a character MongoDB rejects: '{}'",
                store.database
            )));
        }

        if store.connect_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "store.connect_timeout_ms cannot be 0".into(),
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Validation("logging.level cannot be empty".into()));
        }

        Ok(())
    }
}
