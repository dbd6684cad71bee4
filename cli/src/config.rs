//! Configuration management for the sales register tool
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with SR_ prefix

use std::path::PathBuf;

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Where and under which key sales data is kept
    pub storage: StorageConfig,

    pub logging: LoggingConfig,

    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding one file per storage key
    pub data_dir: PathBuf,

    /// Storage slot for the record collection
    pub key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Fallback filter when RUST_LOG is unset
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    /// Default directory for CSV exports and printouts
    pub output_dir: PathBuf,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("SR_ENVIRONMENT").unwrap_or_else(|_| "development".into());
        Self::builder(&environment)?
            // Override with environment variables (SR_ prefix)
            .add_source(
                Environment::with_prefix("SR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    fn builder(
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(config::Config::builder()
            // Start with default values
            .set_default("environment", environment)?
            .set_default("storage.data_dir", "./data")?
            .set_default("storage.key", shared::SALES_DATA_KEY)?
            .set_default("logging.level", "info")?
            .set_default("export.output_dir", ".")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false)))
    }

    /// Tracing filter used when RUST_LOG is not set
    pub fn log_filter(&self) -> String {
        format!(
            "sales_register={level},shared={level}",
            level = self.logging.level
        )
    }
}
