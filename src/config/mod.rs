// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::constants::{DEFAULT_CACHE_CONTROL, DEFAULT_ROUTE_PREFIX};
use crate::image_optimizer::ImageConfig;

pub mod server;
pub mod storage;

pub use server::ServerConfig;
pub use storage::{FilesystemStorageConfig, S3StorageConfig, StorageBackend, StorageConfig};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable '{0}' is referenced but not set")]
    MissingEnv(String),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub response: ResponseConfig,
}

fn default_prefix() -> String {
    DEFAULT_ROUTE_PREFIX.to_string()
}

/// Which request paths reach the image handler
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoutingConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

fn default_cache_control() -> String {
    DEFAULT_CACHE_CONTROL.to_string()
}

/// Headers attached to successful image responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseConfig {
    #[serde(default = "default_cache_control")]
    pub cache_control: String,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            cache_control: default_cache_control(),
        }
    }
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, ConfigError> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        // Every referenced variable must exist before anything is substituted
        let mut values = HashMap::new();
        for caps in re.captures_iter(yaml) {
            let var_name = caps[1].to_string();
            let value =
                std::env::var(&var_name).map_err(|_| ConfigError::MissingEnv(var_name.clone()))?;
            values.insert(var_name, value);
        }

        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            values.get(&caps[1]).cloned().unwrap_or_default()
        });

        Ok(serde_yaml::from_str(&substituted)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate().map_err(ConfigError::Invalid)?;

        let prefix = &self.routing.prefix;
        if !prefix.starts_with('/') || !prefix.ends_with('/') {
            return Err(ConfigError::Invalid(format!(
                "routing.prefix '{}' must start and end with /",
                prefix
            )));
        }

        self.storage.validate().map_err(ConfigError::Invalid)?;
        self.image.validate().map_err(ConfigError::Invalid)?;

        if self.response.cache_control.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "response.cache_control cannot be empty".to_string(),
            ));
        }
        if http::HeaderValue::from_str(&self.response.cache_control).is_err() {
            return Err(ConfigError::Invalid(format!(
                "response.cache_control {:?} is not a valid header value",
                self.response.cache_control
            )));
        }

        Ok(())
    }
}
