//! Configuration loading and management
//!
//! An application is described by one YAML document:
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 8080
//! database:
//!   page_size: 20
//! logging:
//!   filter: info,resource_controller=debug
//! resources:
//!   orders:
//!     create_rules:
//!       customer: required|string
//!       total: [required, numeric, "min:0"]
//!     update_rules:
//!       total: required|numeric
//!     filters:
//!       customer: ~
//!       min_total: { field: total, operator: ">=" }
//!     page_size: 50
//! ```

use crate::core::controller::DEFAULT_PAGE_SIZE;
use crate::core::error::ConfigError;
use crate::core::filter::FilterSpec;
use crate::core::validation::RuleSet;
use anyhow::Result;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// Listening address of the HTTP server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// `host:port`, ready for `TcpListener::bind`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Settings shared by every store
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Page size for resources that do not set their own
    pub page_size: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, overridden by `RUST_LOG`
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Rules, filters and paging of one resource
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    pub create_rules: RuleSet,

    /// Replaces the derived update rule of each field it names
    pub update_rules: Option<RuleSet>,

    pub filters: FilterSpec,

    /// Falls back to `database.page_size` when absent
    pub page_size: Option<usize>,
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub resources: IndexMap<String, ResourceConfig>,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// The configuration of `name` with its page size resolved
    pub fn resource(&self, name: &str) -> Result<ResourceConfig, ConfigError> {
        let mut resource = self
            .resources
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownResource(name.to_string()))?;
        resource.page_size.get_or_insert(self.database.page_size);
        Ok(resource)
    }
}
