//! PrinterSink: logs every packet it receives.

use crate::runtime::component::{Component, ComponentContext};
use crate::runtime::nodes::drain;
use crate::runtime::port::PortDescriptor;

static PORTS: &[PortDescriptor] = &[
    PortDescriptor::input("in"),
    // Usually seeded; read once per run.
    PortDescriptor::input("prefix").optional(),
];

/// Logs each packet at INFO, prefixed by the string on the `prefix` port.
#[derive(Debug, Default)]
pub struct PrinterSink {
    prefix: Option<String>,
    printed: u64,
}

impl PrinterSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for PrinterSink {
    fn type_name(&self) -> &str {
        "Printer"
    }

    fn ports(&self) -> &[PortDescriptor] {
        PORTS
    }

    fn on_execute(&mut self, ctx: &ComponentContext<'_>) -> anyhow::Result<()> {
        if self.prefix.is_none() {
            let prefix = ctx
                .in_port("prefix")?
                .receive()
                .and_then(|p| p.as_str().map(str::to_string))
                .unwrap_or_default();
            self.prefix = Some(prefix);
        }
        let prefix = self.prefix.as_deref().unwrap_or_default();

        let input = ctx.in_port("in")?;
        let eof = drain(input, |packet| {
            self.printed += 1;
            tracing::info!(component = ctx.name(), "{}{:?}", prefix, packet);
        });
        if eof {
            // A static prefix never closes on its own.
            ctx.close_all_in_ports();
            tracing::debug!(
                component = ctx.name(),
                kind = ctx.type_name(),
                printed = self.printed,
                "end of stream"
            );
        }
        Ok(())
    }

    fn on_reset(&mut self) {
        self.prefix = None;
        self.printed = 0;
    }
}
