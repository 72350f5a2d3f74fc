//! MapNode: applies a function to every packet.

use crate::runtime::component::{Component, ComponentContext};
use crate::runtime::nodes::drain;
use crate::runtime::packet::Packet;
use crate::runtime::port::PortDescriptor;

static PORTS: &[PortDescriptor] = &[PortDescriptor::input("in"), PortDescriptor::output("out")];

type MapFn = Box<dyn FnMut(Packet) -> Packet + Send>;

/// Sends `f(packet)` on `out` for every packet on `in`; closes `out` at end
/// of stream.
pub struct MapNode {
    f: MapFn,
}

impl MapNode {
    pub fn new(f: impl FnMut(Packet) -> Packet + Send + 'static) -> Self {
        Self { f: Box::new(f) }
    }
}

impl Component for MapNode {
    fn type_name(&self) -> &str {
        "Map"
    }

    fn ports(&self) -> &[PortDescriptor] {
        PORTS
    }

    fn on_execute(&mut self, ctx: &ComponentContext<'_>) -> anyhow::Result<()> {
        let input = ctx.in_port("in")?;
        let out = ctx.out_port("out")?;
        if drain(input, |packet| out.send((self.f)(packet))) {
            out.close();
        }
        Ok(())
    }
}
