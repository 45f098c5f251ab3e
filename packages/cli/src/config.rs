use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub use storage::StorageAppConfig;

/// Logging configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// `tracing` filter directive, e.g. "info" or "fragments=debug". Default: "warn".
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// CLI application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CliAppConfig {
    #[serde(default)]
    pub storage: StorageAppConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl CliAppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("FRAGMENTS_CONFIG").unwrap_or_else(|_| "config/config".to_string());
        Self::load_from(&config_path)
    }

    fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("storage.backend", "filesystem")?
            .set_default("storage.path", "./data/fragments")?
            .set_default("storage.max_fragment_size", 5_i64 * 1024 * 1024)?
            .set_default("log.level", "warn")?
            // Load from config/config.toml
            .add_source(File::with_name(config_path).required(false))
            // Override from environment (e.g., FRAGMENTS__STORAGE__BACKEND=memory)
            .add_source(Environment::with_prefix("FRAGMENTS").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
