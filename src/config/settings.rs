//! Logging settings
//!
//! Kept separate from [`RuntimeConfig`](super::RuntimeConfig) so the binary
//! can set up logging before anything else is loaded.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default filter directive when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info,flownet=debug";

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives; `RUST_LOG` overrides this when set
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Also write logs to this file (non-blocking, no ANSI colors)
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Colorize console output
    #[serde(default = "default_true")]
    pub ansi: bool,

    /// Include thread names in each line; the component threads are named
    /// `[type] name`
    #[serde(default = "default_true")]
    pub thread_names: bool,
}

fn default_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            file: None,
            ansi: true,
            thread_names: true,
        }
    }
}
