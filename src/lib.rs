//! # flownet: flow-based execution engine
//!
//! A network of independently scheduled components that communicate only
//! through bounded, directional, named ports. Each component runs on its own
//! thread; the network detects when no more data can flow and shuts the
//! graph down by itself.
//!
//! ## Architecture
//!
//! - **Runtime**: ports, component wrappers, network run loop and
//!   termination cascade (see [`runtime`])
//! - **Config**: runtime settings loaded from TOML or JSON
//! - **Logging**: `tracing` subscriber setup, plus logging tracers for port
//!   and lifecycle events
//!
//! ## Example
//!
//! ```no_run
//! use flownet::runtime::nodes::{CollectorSink, CounterSource, MapNode};
//! use flownet::runtime::{NetworkDescription, NetworkFactory, Packet, PortRef};
//! use flownet::RuntimeConfig;
//!
//! # fn main() -> flownet::Result<()> {
//! let (collector, collected) = CollectorSink::new();
//! let mut description = NetworkDescription::new();
//! description
//!     .add_component("counter", CounterSource::new(1..4))
//!     .add_component("double", MapNode::new(|p| Packet::Int(p.as_int().unwrap_or(0) * 2)))
//!     .add_component("collect", collector)
//!     .connect(PortRef::new("counter", "out"), PortRef::new("double", "in"))
//!     .connect(PortRef::new("double", "out"), PortRef::new("collect", "in"));
//!
//! let network = NetworkFactory::build(description, &RuntimeConfig::default())?;
//! network.start_and_terminate()?;
//! assert_eq!(collected.snapshot(), vec![Packet::Int(2), Packet::Int(4), Packet::Int(6)]);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-export commonly used types
pub use config::{LoggingConfig, RuntimeConfig};
pub use error::{FlowError, Result, ResultExt};
pub use runtime::{
    Component, ComponentContext, ComponentId, ComponentState, ComponentTracer, InputPort,
    LoggingTracer, Network, NetworkDescription, NetworkFactory, NetworkHandle, NetworkState,
    NetworkTracer, OutputPort, Packet, PortAddress, PortDescriptor, PortRef, PortTracer,
    Properties, RunOutcome, Tracers,
};
