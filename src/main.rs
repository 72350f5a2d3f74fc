//! flownet demo
//!
//! Builds a small network (counter → doubler → collector, plus a printer
//! chain), runs it once in one-time mode, then twice in continuous mode.
//!
//! Usage: `flownet [config.toml|config.json]`

use flownet::runtime::nodes::{CollectedPackets, CollectorSink, CounterSource, MapNode, PrinterSink};
use flownet::{logging, Network, NetworkDescription, NetworkFactory, Packet, PortRef, RuntimeConfig};

fn build_demo(config: &RuntimeConfig) -> flownet::Result<(Network, CollectedPackets)> {
    let (collector, collected) = CollectorSink::new();
    let mut description = NetworkDescription::new();
    description
        .add_component("counter", CounterSource::new(1..6))
        .add_component(
            "doubler",
            MapNode::new(|p| Packet::Int(p.as_int().unwrap_or_default() * 2)),
        )
        .add_component("collector", collector)
        .add_component("ticks", CounterSource::new(0..3))
        .add_component("printer", PrinterSink::new())
        .connect(PortRef::new("counter", "out"), PortRef::new("doubler", "in"))
        .connect(PortRef::new("doubler", "out"), PortRef::new("collector", "in"))
        .connect(PortRef::new("ticks", "out"), PortRef::new("printer", "in"))
        .seed(PortRef::new("printer", "prefix"), "tick ");

    let network = NetworkFactory::build(description, config)?;
    Ok((network, collected))
}

fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => RuntimeConfig::load(&path)?,
        None => RuntimeConfig::default(),
    };
    let _log_guard = logging::init(&config.logging)?;

    tracing::info!("Starting flownet demo");

    let (network, collected) = build_demo(&config)?;
    let outcome = network.start_and_terminate()?;
    tracing::info!(?outcome, packets = ?collected.take(), "one-time run finished");

    let (network, collected) = build_demo(&config)?;
    for run in 1..=2 {
        let outcome = network.start()?;
        tracing::info!(run, ?outcome, packets = ?collected.take(), "continuous run finished");
    }
    network.terminate();

    tracing::info!("Demo finished");
    Ok(())
}
