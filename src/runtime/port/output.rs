//! Output port: a forwarding handle onto the paired input port's queue.

use crate::runtime::id::PortAddress;
use crate::runtime::packet::Packet;
use crate::runtime::port::buffered::BufferedInPort;
use crate::runtime::shared::NetworkShared;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

pub struct OutPort {
    address: PortAddress,
    owner_name: Arc<str>,
    network: Arc<NetworkShared>,
    target: Arc<BufferedInPort>,
    closed: AtomicBool,
}

impl OutPort {
    pub(crate) fn new(
        address: PortAddress,
        owner_name: Arc<str>,
        network: Arc<NetworkShared>,
        target: Arc<BufferedInPort>,
    ) -> Self {
        Self {
            address,
            owner_name,
            network,
            target,
            closed: AtomicBool::new(false),
        }
    }

    pub fn address(&self) -> &PortAddress {
        &self.address
    }

    pub fn name(&self) -> &str {
        &self.address.name
    }

    pub fn index(&self) -> Option<usize> {
        self.address.index
    }

    /// The input port this output feeds.
    pub fn target(&self) -> &Arc<BufferedInPort> {
        &self.target
    }

    pub fn capacity(&self) -> usize {
        self.target.capacity()
    }

    pub fn packet_count(&self) -> usize {
        self.target.packet_count()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Send a packet downstream, blocking while the paired queue is full.
    ///
    /// Sending on a closed output port is a component bug; the packet is
    /// dropped with a warning.
    pub fn send(&self, packet: Packet) {
        if self.is_closed() {
            warn!(port = %self.address, "send on closed output port, packet dropped");
            return;
        }
        if let Some(tracer) = self.network.tracers().port {
            tracer.on_send(&self.owner_name, &self.address, &packet);
        }
        self.target.append(packet);
    }

    /// True while the paired queue is at capacity. Always true for a
    /// zero-capacity connection, where every send is a hand-off.
    pub fn send_would_block(&self) -> bool {
        self.target.packet_count() == self.target.capacity()
    }

    /// Close the port. Only the first call notifies the paired input port.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(tracer) = self.network.tracers().port {
            tracer.on_close(&self.owner_name, &self.address);
        }
        self.target.out_port_closed();
    }

    pub(crate) fn reset(&self) {
        self.closed.store(false, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for OutPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutPort")
            .field("address", &self.address)
            .field("target", self.target.address())
            .field("closed", &self.is_closed())
            .finish()
    }
}
