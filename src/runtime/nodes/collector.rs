//! CollectorSink: stores every received packet for later inspection.

use crate::runtime::component::{Component, ComponentContext};
use crate::runtime::nodes::drain;
use crate::runtime::packet::Packet;
use crate::runtime::port::PortDescriptor;
use crate::runtime::sync::lock;
use std::sync::{Arc, Mutex};

static PORTS: &[PortDescriptor] = &[PortDescriptor::input("in")];

/// Shared view of what a `CollectorSink` has received.
#[derive(Debug, Clone, Default)]
pub struct CollectedPackets {
    packets: Arc<Mutex<Vec<Packet>>>,
}

impl CollectedPackets {
    pub fn snapshot(&self) -> Vec<Packet> {
        lock(&self.packets).clone()
    }

    /// Take everything collected so far, leaving the store empty.
    pub fn take(&self) -> Vec<Packet> {
        std::mem::take(&mut *lock(&self.packets))
    }

    pub fn len(&self) -> usize {
        lock(&self.packets).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.packets).is_empty()
    }

    fn push(&self, packet: Packet) {
        lock(&self.packets).push(packet);
    }
}

pub struct CollectorSink {
    collected: CollectedPackets,
}

impl CollectorSink {
    /// A sink plus the handle to read what it collects.
    pub fn new() -> (Self, CollectedPackets) {
        let collected = CollectedPackets::default();
        (
            Self {
                collected: collected.clone(),
            },
            collected,
        )
    }
}

impl Component for CollectorSink {
    fn type_name(&self) -> &str {
        "Collector"
    }

    fn ports(&self) -> &[PortDescriptor] {
        PORTS
    }

    fn on_execute(&mut self, ctx: &ComponentContext<'_>) -> anyhow::Result<()> {
        let input = ctx.in_port("in")?;
        drain(input, |packet| self.collected.push(packet));
        Ok(())
    }
}
