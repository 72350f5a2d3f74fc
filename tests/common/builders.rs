//! Test data builders for creating networks

use super::components::ListSource;
use flownet::runtime::nodes::{CollectedPackets, CollectorSink, MapNode};
use flownet::{Network, NetworkDescription, NetworkFactory, Packet, PortRef, RuntimeConfig};

type Stage = Box<dyn FnMut(Packet) -> Packet + Send>;

/// Builder for a linear network: source → map stages → collector
pub struct ChainBuilder {
    values: Vec<Packet>,
    capacity: Option<usize>,
    stages: Vec<Stage>,
    config: RuntimeConfig,
}

impl ChainBuilder {
    pub fn new(values: impl IntoIterator<Item = i64>) -> Self {
        Self {
            values: values.into_iter().map(Packet::Int).collect(),
            capacity: None,
            stages: Vec::new(),
            config: RuntimeConfig::default().with_network_id("chain"),
        }
    }

    /// Capacity of every connection in the chain
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn map(mut self, f: impl FnMut(Packet) -> Packet + Send + 'static) -> Self {
        self.stages.push(Box::new(f));
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> (Network, CollectedPackets) {
        let (collector, collected) = CollectorSink::new();
        let mut description = NetworkDescription::new();
        description.add_component("source", ListSource::new(self.values));

        let mut upstream = PortRef::new("source", "out");
        for (i, stage) in self.stages.into_iter().enumerate() {
            let name = format!("stage{}", i);
            description.add_component(name.clone(), MapNode::new(stage));
            link(&mut description, upstream, PortRef::new(&name, "in"), self.capacity);
            upstream = PortRef::new(name, "out");
        }

        description.add_component("collector", collector);
        link(&mut description, upstream, PortRef::new("collector", "in"), self.capacity);

        let network = NetworkFactory::build(description, &self.config).expect("valid chain");
        (network, collected)
    }
}

fn link(description: &mut NetworkDescription, from: PortRef, to: PortRef, capacity: Option<usize>) {
    match capacity {
        Some(c) => description.connect_with_capacity(from, to, c),
        None => description.connect(from, to),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_builder() {
        let (network, collected) = ChainBuilder::new(0..3).map(|p| p).capacity(1).build();
        assert_eq!(network.components().len(), 3);
        assert!(collected.is_empty());
    }
}
