//! Observer hooks for port, component and network events.
//!
//! Tracers are best-effort side channels: the runtime never depends on them
//! for correctness. They are called synchronously on the thread that caused
//! the event (component state changes fire while the component's state lock
//! is held), so an implementation must be quick and must not call back into
//! the network.

use crate::runtime::component::ComponentState;
use crate::runtime::id::{ComponentId, PortAddress};
use crate::runtime::network::NetworkState;
use crate::runtime::packet::Packet;
use std::sync::Arc;
use tracing::{debug, trace};

/// Port-level events.
pub trait PortTracer: Send + Sync {
    fn on_close(&self, component: &str, port: &PortAddress);
    fn on_receive(&self, component: &str, port: &PortAddress, packet: &Packet);
    fn on_send(&self, component: &str, port: &PortAddress, packet: &Packet);
}

/// Component state transitions.
pub trait ComponentTracer: Send + Sync {
    fn on_state_change(&self, component: &str, id: ComponentId, state: ComponentState);
}

/// Network state transitions.
pub trait NetworkTracer: Send + Sync {
    fn on_state_change(&self, network: &str, state: NetworkState);
}

/// The set of tracers attached to a network.
#[derive(Clone, Default)]
pub struct Tracers {
    pub port: Option<Arc<dyn PortTracer>>,
    pub component: Option<Arc<dyn ComponentTracer>>,
    pub network: Option<Arc<dyn NetworkTracer>>,
}

impl Tracers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_port(mut self, tracer: Arc<dyn PortTracer>) -> Self {
        self.port = Some(tracer);
        self
    }

    pub fn with_component(mut self, tracer: Arc<dyn ComponentTracer>) -> Self {
        self.component = Some(tracer);
        self
    }

    pub fn with_network(mut self, tracer: Arc<dyn NetworkTracer>) -> Self {
        self.network = Some(tracer);
        self
    }
}

impl std::fmt::Debug for Tracers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracers")
            .field("port", &self.port.is_some())
            .field("component", &self.component.is_some())
            .field("network", &self.network.is_some())
            .finish()
    }
}

/// Tracer that forwards every event to `tracing`.
///
/// Port traffic goes out at TRACE, state changes at DEBUG, under the
/// `flownet::trace` target so it can be filtered separately.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingTracer;

impl PortTracer for LoggingTracer {
    fn on_close(&self, component: &str, port: &PortAddress) {
        trace!(target: "flownet::trace", component, %port, "port closed");
    }

    fn on_receive(&self, component: &str, port: &PortAddress, packet: &Packet) {
        trace!(target: "flownet::trace", component, %port, ?packet, "received");
    }

    fn on_send(&self, component: &str, port: &PortAddress, packet: &Packet) {
        trace!(target: "flownet::trace", component, %port, ?packet, "sent");
    }
}

impl ComponentTracer for LoggingTracer {
    fn on_state_change(&self, component: &str, id: ComponentId, state: ComponentState) {
        debug!(target: "flownet::trace", component, %id, ?state, "component state");
    }
}

impl NetworkTracer for LoggingTracer {
    fn on_state_change(&self, network: &str, state: NetworkState) {
        debug!(target: "flownet::trace", network, ?state, "network state");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracers_builder() {
        let tracers = Tracers::none();
        assert!(tracers.port.is_none());

        let tracers = tracers
            .with_port(Arc::new(LoggingTracer))
            .with_network(Arc::new(LoggingTracer));
        assert!(tracers.port.is_some());
        assert!(tracers.component.is_none());
        assert!(tracers.network.is_some());
        assert_eq!(
            format!("{:?}", tracers),
            "Tracers { port: true, component: false, network: true }"
        );
    }
}
