//! Seed port: an input pre-loaded with a literal value.

use crate::error::{FlowError, Result};
use crate::runtime::id::PortAddress;
use crate::runtime::packet::Packet;
use crate::runtime::shared::NetworkShared;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Yields its packet once and then closes, or, when static, yields the same
/// packet on every receive and never closes on its own.
pub struct SeedPort {
    address: PortAddress,
    owner_name: Arc<str>,
    network: Arc<NetworkShared>,
    packet: Packet,
    is_static: bool,
    closed: AtomicBool,
}

impl SeedPort {
    pub(crate) fn new(
        address: PortAddress,
        owner_name: Arc<str>,
        network: Arc<NetworkShared>,
        packet: Option<Packet>,
        is_static: bool,
    ) -> Result<Self> {
        let packet = packet.ok_or_else(|| FlowError::MissingSeedValue {
            component: owner_name.to_string(),
            port: address.name.clone(),
        })?;
        Ok(Self {
            address,
            owner_name,
            network,
            packet,
            is_static,
            closed: AtomicBool::new(false),
        })
    }

    pub fn address(&self) -> &PortAddress {
        &self.address
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// 1 until the value has been taken, 0 after.
    pub fn packet_count(&self) -> usize {
        if self.is_closed() {
            0
        } else {
            1
        }
    }

    pub fn receive(&self) -> Option<Packet> {
        if self.is_static {
            if self.is_closed() {
                return None;
            }
        } else if self.closed.swap(true, Ordering::SeqCst) {
            return None;
        } else if let Some(tracer) = self.network.tracers().port {
            tracer.on_close(&self.owner_name, &self.address);
        }

        if let Some(tracer) = self.network.tracers().port {
            tracer.on_receive(&self.owner_name, &self.address, &self.packet);
        }
        Some(self.packet.clone())
    }

    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(tracer) = self.network.tracers().port {
            tracer.on_close(&self.owner_name, &self.address);
        }
    }

    pub(crate) fn reset(&self) {
        self.closed.store(false, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for SeedPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedPort")
            .field("address", &self.address)
            .field("packet", &self.packet)
            .field("is_static", &self.is_static)
            .field("closed", &self.is_closed())
            .finish()
    }
}
