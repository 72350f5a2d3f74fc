//! MergeNode: interleaves an array of inputs onto one output.
//!
//! No ordering across inputs: whatever is queued is forwarded in input index
//! order on each step. Each input relies on non-blocking peeks, so its
//! connection needs a capacity of at least 1.

use crate::runtime::component::{Component, ComponentContext};
use crate::runtime::nodes::drain;
use crate::runtime::port::{InputPort, PortDescriptor};

static PORTS: &[PortDescriptor] = &[
    PortDescriptor::input_array("in"),
    PortDescriptor::output("out"),
];

#[derive(Debug, Default)]
pub struct MergeNode;

impl MergeNode {
    pub fn new() -> Self {
        Self
    }
}

impl Component for MergeNode {
    fn type_name(&self) -> &str {
        "Merge"
    }

    fn ports(&self) -> &[PortDescriptor] {
        PORTS
    }

    fn on_execute(&mut self, ctx: &ComponentContext<'_>) -> anyhow::Result<()> {
        let inputs = ctx.in_ports("in")?;
        let out = ctx.out_port("out")?;
        for input in inputs.iter().filter(|p| !p.is_closed()) {
            if !input.receive_would_block() || input.is_upstream_closed() {
                drain(input, |packet| out.send(packet));
            }
        }
        if inputs.iter().all(InputPort::is_closed) {
            out.close();
        }
        Ok(())
    }
}
