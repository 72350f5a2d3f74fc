//! CounterSource: emits a range of integers, then closes its output.

use crate::runtime::component::{Component, ComponentContext};
use crate::runtime::packet::Packet;
use crate::runtime::port::PortDescriptor;
use std::ops::Range;

static PORTS: &[PortDescriptor] = &[PortDescriptor::output("out")];

/// Active source: runs without input and sends `start..end` on `out`.
///
/// Stops early if the downstream port is closed or the network terminates.
pub struct CounterSource {
    range: Range<i64>,
    next: i64,
}

impl CounterSource {
    pub fn new(range: Range<i64>) -> Self {
        Self {
            next: range.start,
            range,
        }
    }
}

impl Component for CounterSource {
    fn type_name(&self) -> &str {
        "CounterSource"
    }

    fn ports(&self) -> &[PortDescriptor] {
        PORTS
    }

    fn is_active(&self) -> bool {
        true
    }

    fn on_execute(&mut self, ctx: &ComponentContext<'_>) -> anyhow::Result<()> {
        let out = ctx.out_port("out")?;
        while self.next < self.range.end {
            if out.is_closed() || ctx.is_terminating() {
                break;
            }
            out.send(Packet::Int(self.next));
            self.next += 1;
        }
        out.close();
        Ok(())
    }

    fn on_reset(&mut self) {
        self.next = self.range.start;
    }
}
