//! Ports: the only way components talk to each other.
//!
//! Components declare their ports via static `PortDescriptor` arrays. At build
//! time each declared slot is resolved once into a concrete port kind:
//!
//! - `InputPort::Buffered`: connected input with its own bounded queue.
//! - `InputPort::Seed`: input pre-loaded with a literal value.
//! - `InputPort::Null` / `OutputPort::Null`: optional slot left unconnected.
//! - `OutputPort::Connected`: forwarding handle onto a downstream queue.
//!
//! The enum tag is fixed for the life of the network, so component code can
//! treat all kinds uniformly without checking what it is holding.

pub mod buffered;
pub mod null;
pub mod output;
pub mod seed;
pub mod set;

pub use buffered::BufferedInPort;
pub use null::NullPort;
pub use output::OutPort;
pub use seed::SeedPort;
pub use set::PortSet;

use crate::runtime::id::PortAddress;
use crate::runtime::packet::Packet;
use std::sync::Arc;

/// Whether a port is an input or output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
}

/// Single slot or array of indexed slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortArity {
    Single,
    Array,
}

/// Static descriptor for a component's port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDescriptor {
    pub name: &'static str,
    pub direction: PortDirection,
    pub arity: PortArity,
    /// Input that may be left unconnected: a single port then resolves to a
    /// null port, an array to an empty slice. Outputs may always stay
    /// unconnected.
    pub optional: bool,
}

impl PortDescriptor {
    pub const fn input(name: &'static str) -> Self {
        Self {
            name,
            direction: PortDirection::Input,
            arity: PortArity::Single,
            optional: false,
        }
    }

    pub const fn output(name: &'static str) -> Self {
        Self {
            name,
            direction: PortDirection::Output,
            arity: PortArity::Single,
            optional: false,
        }
    }

    pub const fn input_array(name: &'static str) -> Self {
        Self {
            name,
            direction: PortDirection::Input,
            arity: PortArity::Array,
            optional: false,
        }
    }

    pub const fn output_array(name: &'static str) -> Self {
        Self {
            name,
            direction: PortDirection::Output,
            arity: PortArity::Array,
            optional: false,
        }
    }

    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn is_array(&self) -> bool {
        self.arity == PortArity::Array
    }
}

/// Which concrete kind an input slot resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    Buffered,
    Seed,
    Null,
}

/// A resolved input slot.
#[derive(Debug, Clone)]
pub enum InputPort {
    Buffered(Arc<BufferedInPort>),
    Seed(Arc<SeedPort>),
    Null(NullPort),
}

impl InputPort {
    pub fn address(&self) -> &PortAddress {
        match self {
            InputPort::Buffered(p) => p.address(),
            InputPort::Seed(p) => p.address(),
            InputPort::Null(p) => p.address(),
        }
    }

    pub fn name(&self) -> &str {
        &self.address().name
    }

    pub fn index(&self) -> Option<usize> {
        self.address().index
    }

    pub fn kind(&self) -> PortKind {
        match self {
            InputPort::Buffered(_) => PortKind::Buffered,
            InputPort::Seed(_) => PortKind::Seed,
            InputPort::Null(_) => PortKind::Null,
        }
    }

    /// Next packet, or `None` once the port is closed.
    ///
    /// Blocks only on a buffered port whose queue is empty while its
    /// upstream is still open.
    pub fn receive(&self) -> Option<Packet> {
        match self {
            InputPort::Buffered(p) => p.receive(),
            InputPort::Seed(p) => p.receive(),
            InputPort::Null(_) => None,
        }
    }

    /// True iff a buffered queue is currently empty. Seed and null ports
    /// never block.
    pub fn receive_would_block(&self) -> bool {
        match self {
            InputPort::Buffered(p) => p.receive_would_block(),
            InputPort::Seed(_) | InputPort::Null(_) => false,
        }
    }

    pub fn is_closed(&self) -> bool {
        match self {
            InputPort::Buffered(p) => p.is_closed(),
            InputPort::Seed(p) => p.is_closed(),
            InputPort::Null(_) => true,
        }
    }

    /// True when no new data can ever arrive beyond what is queued.
    pub fn is_upstream_closed(&self) -> bool {
        match self {
            InputPort::Buffered(p) => p.is_upstream_closed(),
            InputPort::Seed(_) | InputPort::Null(_) => true,
        }
    }

    pub fn close(&self) {
        match self {
            InputPort::Buffered(p) => p.close(),
            InputPort::Seed(p) => p.close(),
            InputPort::Null(_) => {}
        }
    }

    pub fn capacity(&self) -> usize {
        match self {
            InputPort::Buffered(p) => p.capacity(),
            InputPort::Seed(_) => 1,
            InputPort::Null(_) => 0,
        }
    }

    pub fn packet_count(&self) -> usize {
        match self {
            InputPort::Buffered(p) => p.packet_count(),
            InputPort::Seed(p) => p.packet_count(),
            InputPort::Null(_) => 0,
        }
    }

    pub fn as_buffered(&self) -> Option<&Arc<BufferedInPort>> {
        match self {
            InputPort::Buffered(p) => Some(p),
            _ => None,
        }
    }

    pub(crate) fn reset(&self) {
        match self {
            InputPort::Buffered(p) => p.reset(),
            InputPort::Seed(p) => p.reset(),
            InputPort::Null(_) => {}
        }
    }
}

/// A resolved output slot.
#[derive(Debug, Clone)]
pub enum OutputPort {
    Connected(Arc<OutPort>),
    Null(NullPort),
}

impl OutputPort {
    pub fn address(&self) -> &PortAddress {
        match self {
            OutputPort::Connected(p) => p.address(),
            OutputPort::Null(p) => p.address(),
        }
    }

    pub fn name(&self) -> &str {
        &self.address().name
    }

    pub fn index(&self) -> Option<usize> {
        self.address().index
    }

    /// Send a packet. A no-op on a null port.
    pub fn send(&self, packet: impl Into<Packet>) {
        match self {
            OutputPort::Connected(p) => p.send(packet.into()),
            OutputPort::Null(_) => {}
        }
    }

    pub fn send_would_block(&self) -> bool {
        match self {
            OutputPort::Connected(p) => p.send_would_block(),
            OutputPort::Null(_) => false,
        }
    }

    pub fn is_closed(&self) -> bool {
        match self {
            OutputPort::Connected(p) => p.is_closed(),
            OutputPort::Null(_) => true,
        }
    }

    pub fn close(&self) {
        if let OutputPort::Connected(p) = self {
            p.close();
        }
    }

    pub fn capacity(&self) -> usize {
        match self {
            OutputPort::Connected(p) => p.capacity(),
            OutputPort::Null(_) => 0,
        }
    }

    pub fn packet_count(&self) -> usize {
        match self {
            OutputPort::Connected(p) => p.packet_count(),
            OutputPort::Null(_) => 0,
        }
    }

    pub fn as_connected(&self) -> Option<&Arc<OutPort>> {
        match self {
            OutputPort::Connected(p) => Some(p),
            OutputPort::Null(_) => None,
        }
    }

    pub(crate) fn reset(&self) {
        if let OutputPort::Connected(p) = self {
            p.reset();
        }
    }
}
