//! Components used only by tests

use flownet::{Component, ComponentContext, NetworkHandle, Packet, PortDescriptor};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

static SOURCE_PORTS: &[PortDescriptor] = &[PortDescriptor::output("out")];
static SINK_PORTS: &[PortDescriptor] = &[PortDescriptor::input("in")];
static PASS_PORTS: &[PortDescriptor] = &[PortDescriptor::input("in"), PortDescriptor::output("out")];

/// Active source that sends a fixed list of packets and closes
pub struct ListSource {
    packets: Vec<Packet>,
}

impl ListSource {
    pub fn new(packets: Vec<Packet>) -> Self {
        Self { packets }
    }

    pub fn ints(values: &[i64]) -> Self {
        Self::new(values.iter().copied().map(Packet::Int).collect())
    }
}

impl Component for ListSource {
    fn type_name(&self) -> &str {
        "ListSource"
    }

    fn ports(&self) -> &[PortDescriptor] {
        SOURCE_PORTS
    }

    fn is_active(&self) -> bool {
        true
    }

    fn on_execute(&mut self, ctx: &ComponentContext<'_>) -> anyhow::Result<()> {
        let out = ctx.out_port("out")?;
        for packet in &self.packets {
            out.send(packet.clone());
        }
        out.close();
        Ok(())
    }
}

/// Active source that never closes; only `terminate()` stops it
#[derive(Default)]
pub struct EndlessSource {
    next: i64,
}

impl Component for EndlessSource {
    fn type_name(&self) -> &str {
        "EndlessSource"
    }

    fn ports(&self) -> &[PortDescriptor] {
        SOURCE_PORTS
    }

    fn is_active(&self) -> bool {
        true
    }

    fn on_execute(&mut self, ctx: &ComponentContext<'_>) -> anyhow::Result<()> {
        let out = ctx.out_port("out")?;
        while !ctx.is_terminating() {
            out.send(Packet::Int(self.next));
            self.next += 1;
        }
        Ok(())
    }
}

/// Sink that records every `receive()` result up to and including the
/// end-of-stream `None`, and whether the port was closed afterwards
#[derive(Clone, Default)]
pub struct EofProbe {
    pub received: Arc<Mutex<Vec<Option<Packet>>>>,
    pub closed_after_eof: Arc<AtomicBool>,
}

impl EofProbe {
    pub fn received(&self) -> Vec<Option<Packet>> {
        self.received.lock().unwrap().clone()
    }
}

impl Component for EofProbe {
    fn type_name(&self) -> &str {
        "EofProbe"
    }

    fn ports(&self) -> &[PortDescriptor] {
        SINK_PORTS
    }

    fn on_execute(&mut self, ctx: &ComponentContext<'_>) -> anyhow::Result<()> {
        let input = ctx.in_port("in")?;
        loop {
            let packet = input.receive();
            let eof = packet.is_none();
            self.received.lock().unwrap().push(packet);
            if eof {
                self.closed_after_eof.store(input.is_closed(), Ordering::SeqCst);
                return Ok(());
            }
        }
    }
}

/// Reads its seed port twice in one step and records both results
#[derive(Clone, Default)]
pub struct SeedReader {
    pub reads: Arc<Mutex<Vec<Option<Packet>>>>,
    pub closed: Arc<AtomicBool>,
}

impl Component for SeedReader {
    fn type_name(&self) -> &str {
        "SeedReader"
    }

    fn ports(&self) -> &[PortDescriptor] {
        static PORTS: &[PortDescriptor] = &[PortDescriptor::input("start")];
        PORTS
    }

    fn on_execute(&mut self, ctx: &ComponentContext<'_>) -> anyhow::Result<()> {
        let start = ctx.in_port("start")?;
        let first = start.receive();
        let second = start.receive();
        self.reads.lock().unwrap().extend([first, second]);
        self.closed.store(start.is_closed(), Ordering::SeqCst);
        // A static seed never closes by itself.
        ctx.close_all_ports();
        Ok(())
    }
}

/// Hook and step counters shared with a `Counting` component
#[derive(Debug, Default)]
pub struct HookCounts {
    pub executes: AtomicUsize,
    pub finishes: AtomicUsize,
    pub resets: AtomicUsize,
    pub terminates: AtomicUsize,
}

impl HookCounts {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Pass-through that counts its steps and lifecycle hooks
pub struct Counting {
    pub counts: Arc<HookCounts>,
}

impl Counting {
    pub fn new() -> (Self, Arc<HookCounts>) {
        let counts = Arc::new(HookCounts::default());
        (
            Self {
                counts: counts.clone(),
            },
            counts,
        )
    }
}

impl Component for Counting {
    fn type_name(&self) -> &str {
        "Counting"
    }

    fn ports(&self) -> &[PortDescriptor] {
        PASS_PORTS
    }

    fn on_execute(&mut self, ctx: &ComponentContext<'_>) -> anyhow::Result<()> {
        self.counts.executes.fetch_add(1, Ordering::SeqCst);
        let input = ctx.in_port("in")?;
        let out = ctx.out_port("out")?;
        loop {
            match input.receive() {
                Some(packet) => out.send(packet),
                None => break,
            }
            if input.receive_would_block() {
                break;
            }
        }
        if input.is_closed() {
            out.close();
        }
        Ok(())
    }

    fn on_finish(&mut self) {
        self.counts.finishes.fetch_add(1, Ordering::SeqCst);
    }

    fn on_reset(&mut self) {
        self.counts.resets.fetch_add(1, Ordering::SeqCst);
    }

    fn on_terminate(&mut self) {
        self.counts.terminates.fetch_add(1, Ordering::SeqCst);
    }
}

/// Pass-through that errors on `Int(2)` and panics on `Int(4)`
pub struct Flaky;

impl Component for Flaky {
    fn type_name(&self) -> &str {
        "Flaky"
    }

    fn ports(&self) -> &[PortDescriptor] {
        PASS_PORTS
    }

    fn on_execute(&mut self, ctx: &ComponentContext<'_>) -> anyhow::Result<()> {
        let input = ctx.in_port("in")?;
        let out = ctx.out_port("out")?;
        loop {
            match input.receive() {
                Some(Packet::Int(2)) => anyhow::bail!("refusing packet 2"),
                Some(Packet::Int(4)) => panic!("packet 4 is cursed"),
                Some(packet) => out.send(packet),
                None => {
                    if input.is_closed() {
                        out.close();
                    }
                    return Ok(());
                }
            }
            if input.receive_would_block() {
                return Ok(());
            }
        }
    }
}

/// Sink that sums integer packets into network and component properties,
/// scaled by the runtime property `factor`
pub struct PropertySink;

impl Component for PropertySink {
    fn type_name(&self) -> &str {
        "PropertySink"
    }

    fn ports(&self) -> &[PortDescriptor] {
        SINK_PORTS
    }

    fn on_execute(&mut self, ctx: &ComponentContext<'_>) -> anyhow::Result<()> {
        let factor = ctx
            .runtime_property("factor")
            .and_then(|p| p.as_int())
            .unwrap_or(1);
        let input = ctx.in_port("in")?;
        while let Some(packet) = input.receive() {
            let value = packet.as_int().unwrap_or(0) * factor;
            let total = ctx
                .network_property("total")
                .and_then(|p| p.as_int())
                .unwrap_or(0);
            ctx.set_network_property("total", total + value);
            ctx.properties().set("last", value);
        }
        Ok(())
    }
}

/// Sink that terminates the whole network from inside its first step
#[derive(Clone, Default)]
pub struct StopOnFirst {
    /// Filled in once the network is built
    pub handle: Arc<OnceLock<NetworkHandle>>,
    pub received: Arc<Mutex<Vec<Packet>>>,
    pub terminate_hook_ran: Arc<AtomicBool>,
}

impl Component for StopOnFirst {
    fn type_name(&self) -> &str {
        "StopOnFirst"
    }

    fn ports(&self) -> &[PortDescriptor] {
        SINK_PORTS
    }

    fn on_execute(&mut self, ctx: &ComponentContext<'_>) -> anyhow::Result<()> {
        if let Some(packet) = ctx.in_port("in")?.receive() {
            self.received.lock().unwrap().push(packet);
            if let Some(handle) = self.handle.get() {
                handle.terminate();
            }
        }
        Ok(())
    }

    fn on_terminate(&mut self) {
        self.terminate_hook_ran.store(true, Ordering::SeqCst);
    }
}
