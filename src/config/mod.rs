//! Configuration module for flownet
//!
//! [`RuntimeConfig`] carries everything the network factory needs that is not
//! part of the graph itself: network id, default queue capacity, thread
//! settings, which tracers to attach, and logging.
//!
//! # Files
//!
//! Config files are TOML (`.toml`) or JSON (anything else). Every field has a
//! default, so an empty file is a valid config.
//!
//! ```toml
//! network_id = "ingest"
//! default_capacity = 32
//! trace_ports = false
//! trace_components = true
//!
//! [logging]
//! filter = "info,flownet=trace"
//! file = "flownet.log"
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Queue capacity used for connections that do not set their own
pub const DEFAULT_CAPACITY: usize = 10;

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Network identifier; a millisecond timestamp when unset
    #[serde(default)]
    pub network_id: Option<String>,

    /// Capacity for connections without an explicit one
    #[serde(default = "default_capacity")]
    pub default_capacity: usize,

    /// Stack size for component threads (platform default when unset)
    #[serde(default)]
    pub thread_stack_size: Option<usize>,

    /// Attach a logging tracer for port close/send/receive events
    #[serde(default)]
    pub trace_ports: bool,

    /// Attach a logging tracer for component and network state changes
    #[serde(default)]
    pub trace_components: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            network_id: None,
            default_capacity: DEFAULT_CAPACITY,
            thread_stack_size: None,
            trace_ports: false,
            trace_components: false,
            logging: LoggingConfig::default(),
        }
    }
}

/// Network id used when none is configured: milliseconds since the epoch
pub fn default_network_id() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

impl RuntimeConfig {
    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            FlowError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config: Self = if is_toml(path) {
            toml::from_str(&content).map_err(|e| {
                FlowError::Config(format!("Failed to parse config file {:?}: {}", path, e))
            })?
        } else {
            serde_json::from_str(&content).map_err(|e| {
                FlowError::Config(format!("Failed to parse config file {:?}: {}", path, e))
            })?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, returning defaults if any error occurs
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Save config to disk, as TOML or JSON depending on the extension
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                FlowError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = if is_toml(path) {
            toml::to_string_pretty(self)
                .map_err(|e| FlowError::Serialization(format!("Failed to serialize config: {}", e)))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| FlowError::Serialization(format!("Failed to serialize config: {}", e)))?
        };

        std::fs::write(path, content).map_err(|e| {
            FlowError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(id) = &self.network_id {
            if id.trim().is_empty() {
                return Err(FlowError::Config("network_id must not be empty".into()));
            }
        }
        if self.thread_stack_size == Some(0) {
            return Err(FlowError::Config("thread_stack_size must be positive".into()));
        }
        Ok(())
    }

    /// Configured network id, or a fresh timestamp id
    pub fn resolve_network_id(&self) -> String {
        self.network_id.clone().unwrap_or_else(default_network_id)
    }

    pub fn with_network_id(mut self, id: impl Into<String>) -> Self {
        self.network_id = Some(id.into());
        self
    }

    pub fn with_default_capacity(mut self, capacity: usize) -> Self {
        self.default_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_config_default() {
        let config = RuntimeConfig::default();
        assert_eq!(config.default_capacity, 10);
        assert!(config.network_id.is_none());
        assert!(!config.trace_ports);
        assert_eq!(config.logging.filter, DEFAULT_LOG_FILTER);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_documents_use_defaults() {
        let from_toml: RuntimeConfig = toml::from_str("").unwrap();
        let from_json: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(from_toml, RuntimeConfig::default());
        assert_eq!(from_json, RuntimeConfig::default());
    }

    #[test]
    fn test_validate_rejects_blank_id() {
        let config = RuntimeConfig::default().with_network_id("  ");
        assert!(matches!(config.validate(), Err(FlowError::Config(_))));
    }

    #[test]
    fn test_resolve_network_id() {
        let config = RuntimeConfig::default().with_network_id("ingest");
        assert_eq!(config.resolve_network_id(), "ingest");

        let generated = RuntimeConfig::default().resolve_network_id();
        assert!(generated.parse::<i64>().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config: RuntimeConfig = toml::from_str(
            r#"
            default_capacity = 0
            [logging]
            ansi = false
            "#,
        )
        .unwrap();
        assert_eq!(config.default_capacity, 0);
        assert!(!config.logging.ansi);
        assert_eq!(config.logging.filter, DEFAULT_LOG_FILTER);
    }
}
