//! FilterNode: forwards only packets matching a predicate.
//!
//! With `invert`, the predicate selects packets to drop instead.

use crate::runtime::component::{Component, ComponentContext};
use crate::runtime::nodes::drain;
use crate::runtime::packet::Packet;
use crate::runtime::port::PortDescriptor;

static PORTS: &[PortDescriptor] = &[PortDescriptor::input("in"), PortDescriptor::output("out")];

type Predicate = Box<dyn Fn(&Packet) -> bool + Send>;

pub struct FilterNode {
    predicate: Predicate,
    /// Invert mode: drop matching packets instead of keeping them.
    invert_mode: bool,
}

impl FilterNode {
    pub fn new(predicate: impl Fn(&Packet) -> bool + Send + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
            invert_mode: false,
        }
    }

    pub fn inverted(mut self) -> Self {
        self.invert_mode = true;
        self
    }
}

impl Component for FilterNode {
    fn type_name(&self) -> &str {
        "Filter"
    }

    fn ports(&self) -> &[PortDescriptor] {
        PORTS
    }

    fn on_execute(&mut self, ctx: &ComponentContext<'_>) -> anyhow::Result<()> {
        let input = ctx.in_port("in")?;
        let out = ctx.out_port("out")?;
        let eof = drain(input, |packet| {
            // Pass if: (matches AND !invert) OR (!matches AND invert)
            if (self.predicate)(&packet) != self.invert_mode {
                out.send(packet);
            }
        });
        if eof {
            out.close();
        }
        Ok(())
    }
}
