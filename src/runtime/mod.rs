//! Flow-based runtime: components on dedicated threads, wired by bounded
//! ports.
//!
//! Components never call each other. Each one reads its input ports and
//! writes its output ports; the graph topology is the only coordination.
//!
//! # Architecture
//!
//! ```text
//! NetworkDescription ──► NetworkFactory ──► Network
//!                                             │ owns
//!                                             ▼
//!                          ComponentWrapper (one thread each)
//!                             │ owns
//!                             ▼
//!   OutPort ──send──► BufferedInPort (bounded queue) ──receive──► logic
//! ```
//!
//! # Design
//!
//! - **Thread per component**: started lazily on the first packet, or at
//!   network start for sources; parked between runs in continuous mode.
//! - **Mailbox per input port**: a bounded crossbeam channel. Capacity 0
//!   makes every send a hand-off.
//! - **Tagged port kinds**: buffered, seed and null inputs are one enum,
//!   resolved once at build time.
//! - **Finish events**: component threads report to the network over a
//!   single channel; the run loop owns the set of unfinished components and
//!   drives the termination cascade.
//! - **Shutdown signal**: `terminate()` disconnects one channel that every
//!   blocking wait selects on.

pub mod component;
pub mod description;
pub mod factory;
pub mod id;
pub mod network;
pub mod nodes;
pub mod packet;
pub mod port;
pub mod properties;
pub(crate) mod shared;
pub(crate) mod sync;
pub mod tracer;
pub mod wrapper;

pub use component::{Component, ComponentContext, ComponentState, ComponentType};
pub use description::{Connection, NetworkDescription, PortRef, Seed};
pub use factory::NetworkFactory;
pub use id::{ComponentId, PortAddress};
pub use network::{Network, NetworkHandle, NetworkState, RunOutcome};
pub use packet::Packet;
pub use port::{InputPort, OutputPort, PortArity, PortDescriptor, PortDirection, PortKind};
pub use properties::Properties;
pub use tracer::{ComponentTracer, LoggingTracer, NetworkTracer, PortTracer, Tracers};
pub use wrapper::ComponentWrapper;
