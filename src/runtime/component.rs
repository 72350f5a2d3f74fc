//! Component abstraction: user logic plus the context it runs with.
//!
//! A component never calls another component. Each processing step reads
//! from its input ports and writes to its output ports through the
//! `ComponentContext`; the wrapper decides when the next step runs.

use crate::error::{FlowError, Result};
use crate::runtime::id::ComponentId;
use crate::runtime::packet::Packet;
use crate::runtime::port::{InputPort, OutputPort, PortDescriptor};
use crate::runtime::properties::Properties;
use crate::runtime::wrapper::ComponentWrapper;

/// Lifecycle state of a component wrapper.
///
/// ```text
/// Initialized ─► Active ⇄ Inactive ─► Finished ─► Resetted ─► Active …
///        any state ─► Terminated
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentState {
    /// Built, thread not started yet.
    Initialized,
    /// Running a processing step.
    Active,
    /// Idle, waiting for data on one of its inputs.
    Inactive,
    /// All ports closed and finish hook called.
    Finished,
    /// Reset for the next run; thread parked in continuous mode.
    Resetted,
    Terminated,
}

/// Type descriptor of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentType {
    pub name: String,
    /// Runnable without any input; started as soon as the network runs.
    pub active: bool,
}

/// Trait for user-defined processing logic.
///
/// `on_execute` is called once per scheduling step. Returning an error (or
/// panicking) is logged and treated as a step that did nothing; the network
/// keeps running.
pub trait Component: Send {
    /// Human-readable type name, used in logs and thread names.
    fn type_name(&self) -> &str;

    /// Port descriptors for this component.
    fn ports(&self) -> &[PortDescriptor];

    /// Whether this component produces data without any input.
    fn is_active(&self) -> bool {
        false
    }

    /// One processing step.
    fn on_execute(&mut self, ctx: &ComponentContext<'_>) -> anyhow::Result<()>;

    /// Called by the network once the component has finished.
    fn on_finish(&mut self) {}

    /// Called before the network runs again in continuous mode.
    fn on_reset(&mut self) {}

    /// Called when the network is terminated.
    fn on_terminate(&mut self) {}
}

/// What a component sees of the runtime during a step.
pub struct ComponentContext<'a> {
    wrapper: &'a ComponentWrapper,
}

impl<'a> ComponentContext<'a> {
    pub(crate) fn new(wrapper: &'a ComponentWrapper) -> Self {
        Self { wrapper }
    }

    pub fn id(&self) -> ComponentId {
        self.wrapper.id()
    }

    /// Name given to the component in the network description.
    pub fn name(&self) -> &str {
        self.wrapper.name()
    }

    pub fn component_type(&self) -> &ComponentType {
        self.wrapper.component_type()
    }

    pub fn type_name(&self) -> &str {
        &self.wrapper.component_type().name
    }

    pub fn network_id(&self) -> &str {
        self.wrapper.network_id()
    }

    fn unknown_port(&self, port: &str) -> FlowError {
        FlowError::UnknownPort {
            component: self.name().to_string(),
            port: port.to_string(),
        }
    }

    /// Single input port by name.
    pub fn in_port(&self, name: &str) -> Result<&'a InputPort> {
        self.wrapper
            .ports()
            .input(name)
            .ok_or_else(|| self.unknown_port(name))
    }

    /// Array input port by name; empty if nothing was connected.
    pub fn in_ports(&self, name: &str) -> Result<&'a [InputPort]> {
        self.wrapper
            .ports()
            .input_array(name)
            .ok_or_else(|| self.unknown_port(name))
    }

    pub fn out_port(&self, name: &str) -> Result<&'a OutputPort> {
        self.wrapper
            .ports()
            .output(name)
            .ok_or_else(|| self.unknown_port(name))
    }

    pub fn out_ports(&self, name: &str) -> Result<&'a [OutputPort]> {
        self.wrapper
            .ports()
            .output_array(name)
            .ok_or_else(|| self.unknown_port(name))
    }

    /// Every input slot of this component.
    pub fn all_in_ports(&self) -> &'a [InputPort] {
        self.wrapper.ports().inputs()
    }

    pub fn all_out_ports(&self) -> &'a [OutputPort] {
        self.wrapper.ports().outputs()
    }

    pub fn close_all_in_ports(&self) {
        self.all_in_ports().iter().for_each(InputPort::close);
    }

    pub fn close_all_out_ports(&self) {
        self.all_out_ports().iter().for_each(OutputPort::close);
    }

    pub fn close_all_ports(&self) {
        self.close_all_in_ports();
        self.close_all_out_ports();
    }

    /// Properties shared by every component of the network.
    pub fn network_properties(&self) -> &'a Properties {
        self.wrapper.network_properties()
    }

    pub fn network_property(&self, key: &str) -> Option<Packet> {
        self.network_properties().get(key)
    }

    /// Returns the previous value.
    pub fn set_network_property(
        &self,
        key: impl Into<String>,
        value: impl Into<Packet>,
    ) -> Option<Packet> {
        self.network_properties().set(key, value)
    }

    /// Properties set by the host before the run.
    pub fn runtime_property(&self, key: &str) -> Option<Packet> {
        self.wrapper.runtime_properties().get(key)
    }

    /// This component's own properties.
    pub fn properties(&self) -> &'a Properties {
        self.wrapper.properties()
    }

    /// True once the network is being terminated. Long-running steps that do
    /// not block on ports should poll this.
    pub fn is_terminating(&self) -> bool {
        self.wrapper.is_interrupted()
    }
}
