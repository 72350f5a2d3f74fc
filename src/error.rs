//! Error handling for flownet
//!
//! This module defines the crate-wide error type and a Result alias. Faults
//! raised inside user component logic are *not* represented here: those are
//! `anyhow::Error`s caught per step by the component wrapper.

use crate::runtime::component::ComponentState;
use crate::runtime::id::ComponentId;
use thiserror::Error;

/// Main error type for flownet operations
#[derive(Error, Debug)]
pub enum FlowError {
    /// A lifecycle transition was requested from a state that does not allow it
    #[error("Component '{component}' cannot be run from state {state:?}")]
    InvalidState {
        component: String,
        state: ComponentState,
    },

    /// A network-level lifecycle operation was called in the wrong state
    #[error("Network state error: {0}")]
    NetworkState(String),

    /// The termination cascade saw a finish report for a component that was
    /// not waiting to finish
    #[error("Component {0} reported finished but was not running")]
    UnknownFinishedComponent(ComponentId),

    /// A description referenced a component id that does not exist
    #[error("Unknown component '{0}'")]
    UnknownComponent(String),

    /// Two components in one description share a name
    #[error("Component '{0}' is declared twice")]
    DuplicateComponent(String),

    /// A port reference string could not be parsed
    #[error("Invalid port reference '{0}', expected 'component.port' or 'component.port[index]'")]
    InvalidPortRef(String),

    /// A description referenced a port the component does not declare
    #[error("Component '{component}' has no port '{port}'")]
    UnknownPort { component: String, port: String },

    /// The same port name was declared twice on one component
    #[error("Component '{component}' declares port '{port}' twice")]
    DuplicatePort { component: String, port: String },

    /// A required input port was neither connected nor seeded
    #[error("In-port '{component}.{port}' must be connected")]
    UnconnectedPort { component: String, port: String },

    /// An array port slot was connected or seeded more than once
    #[error("Port '{component}.{port}' is already connected or initialized")]
    AlreadyConnected { component: String, port: String },

    /// An array port has holes in its connected index range
    #[error("Array port '{component}.{port}' has a gap at index {index}")]
    PortIndexGap {
        component: String,
        port: String,
        index: usize,
    },

    /// A seed port was described without a value
    #[error("Seed port '{component}.{port}' has no value")]
    MissingSeedValue { component: String, port: String },

    /// The OS refused to spawn a component thread
    #[error("Failed to spawn thread for component '{component}': {source}")]
    ThreadSpawn {
        component: String,
        #[source]
        source: std::io::Error,
    },

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<FlowError>,
    },
}

impl FlowError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        FlowError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for flownet operations
pub type Result<T> = std::result::Result<T, FlowError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FlowError::UnknownComponent("reader".to_string());
        assert_eq!(err.to_string(), "Unknown component 'reader'");
    }

    #[test]
    fn test_error_with_context() {
        let err = FlowError::Config("bad capacity".to_string());
        let with_ctx = err.with_context("Failed to load runtime.toml");
        assert!(with_ctx.to_string().contains("Failed to load runtime.toml"));
        assert!(with_ctx.to_string().contains("bad capacity"));
    }

    #[test]
    fn test_invalid_state_error() {
        let err = FlowError::InvalidState {
            component: "counter".to_string(),
            state: ComponentState::Finished,
        };
        assert!(err.to_string().contains("counter"));
        assert!(err.to_string().contains("Finished"));
    }

    #[test]
    fn test_result_ext_context() {
        let res: Result<()> = Err(FlowError::NetworkState("terminated".into()));
        let err = res.context("start").unwrap_err();
        assert!(matches!(err, FlowError::WithContext { .. }));
    }
}
