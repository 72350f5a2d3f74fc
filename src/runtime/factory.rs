//! Instantiates a runnable `Network` from a `NetworkDescription`.
//!
//! Construction is two-phase because ports and wrappers reference each
//! other: wrappers are created first with empty port sets, then every input
//! slot is resolved (buffered, seed or null), then every output slot is
//! wired to the buffered input it feeds, and finally the port sets are
//! installed.

use crate::config::RuntimeConfig;
use crate::error::{FlowError, Result};
use crate::runtime::description::{NetworkDescription, PortRef};
use crate::runtime::id::{ComponentId, PortAddress};
use crate::runtime::network::Network;
use crate::runtime::packet::Packet;
use crate::runtime::port::{
    BufferedInPort, InputPort, NullPort, OutPort, OutputPort, PortDescriptor, PortDirection,
    PortSet, SeedPort,
};
use crate::runtime::shared::NetworkShared;
use crate::runtime::tracer::{LoggingTracer, Tracers};
use crate::runtime::wrapper::ComponentWrapper;
use crossbeam_channel::unbounded;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// How an input slot is fed.
enum InputSource {
    Connection { capacity: usize },
    Seed { value: Option<Packet>, is_static: bool },
}

/// Per-component data the factory needs after the logic has moved into its
/// wrapper.
struct Declared {
    wrapper: Arc<ComponentWrapper>,
    owner_name: Arc<str>,
    descriptors: Vec<PortDescriptor>,
}

/// Slot key: (component, port name) → index → value. Single ports use index 0.
type Slots<T> = HashMap<(ComponentId, &'static str), BTreeMap<usize, T>>;

pub struct NetworkFactory;

impl NetworkFactory {
    /// Build a network from a description.
    ///
    /// Fails on references to unknown components or ports, on a slot used
    /// twice, on gaps in an array port's indices and on seeds without value.
    /// Unconnected single ports become null ports; unconnected array ports
    /// become empty.
    pub fn build(description: NetworkDescription, config: &RuntimeConfig) -> Result<Network> {
        let (events_tx, events_rx) = unbounded();
        let shared = Arc::new(NetworkShared::new(
            config.resolve_network_id(),
            config.thread_stack_size,
            tracers_for(config),
            events_tx,
        ));

        let NetworkDescription {
            components,
            connections,
            seeds,
        } = description;

        // ── Wrappers ──
        let mut declared: Vec<Declared> = Vec::with_capacity(components.len());
        let mut by_name: HashMap<String, ComponentId> = HashMap::new();
        for (index, entry) in components.into_iter().enumerate() {
            let id = ComponentId(index as u32);
            if by_name.insert(entry.name.clone(), id).is_some() {
                return Err(FlowError::DuplicateComponent(entry.name));
            }
            let descriptors = entry.logic.ports().to_vec();
            for (i, desc) in descriptors.iter().enumerate() {
                if descriptors[..i].iter().any(|d| d.name == desc.name) {
                    return Err(FlowError::DuplicatePort {
                        component: entry.name.clone(),
                        port: desc.name.to_string(),
                    });
                }
            }
            let owner_name: Arc<str> = Arc::from(entry.name.as_str());
            let wrapper = Arc::new(ComponentWrapper::new(
                id,
                entry.name,
                entry.logic,
                Arc::clone(&shared),
            ));
            declared.push(Declared {
                wrapper,
                owner_name,
                descriptors,
            });
        }

        let resolve = |port: &PortRef, direction: PortDirection| -> Result<(ComponentId, &'static str, usize)> {
            let id = *by_name
                .get(&port.component)
                .ok_or_else(|| FlowError::UnknownComponent(port.component.clone()))?;
            let desc = declared[id.index()]
                .descriptors
                .iter()
                .find(|d| d.name == port.port && d.direction == direction)
                .filter(|d| d.is_array() == port.index.is_some())
                .ok_or_else(|| FlowError::UnknownPort {
                    component: port.component.clone(),
                    port: port.to_string(),
                })?;
            Ok((id, desc.name, port.index.unwrap_or(0)))
        };

        let already_connected = |port: &PortRef| FlowError::AlreadyConnected {
            component: port.component.clone(),
            port: port.to_string(),
        };

        // ── Gather slot sources ──
        let mut in_slots: Slots<InputSource> = HashMap::new();
        let mut out_slots: Slots<(ComponentId, &'static str, usize)> = HashMap::new();

        for conn in &connections {
            let target = resolve(&conn.to, PortDirection::Input)?;
            let source = resolve(&conn.from, PortDirection::Output)?;
            let capacity = conn.capacity.unwrap_or(config.default_capacity);

            let inputs = in_slots.entry((target.0, target.1)).or_default();
            if inputs.contains_key(&target.2) {
                return Err(already_connected(&conn.to));
            }
            inputs.insert(target.2, InputSource::Connection { capacity });

            let outputs = out_slots.entry((source.0, source.1)).or_default();
            if outputs.contains_key(&source.2) {
                return Err(already_connected(&conn.from));
            }
            outputs.insert(source.2, target);
        }

        for seed in seeds {
            let target = resolve(&seed.to, PortDirection::Input)?;
            let inputs = in_slots.entry((target.0, target.1)).or_default();
            if inputs.contains_key(&target.2) {
                return Err(already_connected(&seed.to));
            }
            inputs.insert(
                target.2,
                InputSource::Seed {
                    value: seed.value,
                    is_static: seed.is_static,
                },
            );
        }

        // ── Input ports ──
        let mut sets: Vec<PortSet> = declared.iter().map(|_| PortSet::new()).collect();
        let mut buffered: HashMap<(ComponentId, &'static str, usize), Arc<BufferedInPort>> =
            HashMap::new();

        for decl in &declared {
            let id = decl.wrapper.id();
            for desc in decl
                .descriptors
                .iter()
                .filter(|d| d.direction == PortDirection::Input)
            {
                let slots = in_slots.remove(&(id, desc.name)).unwrap_or_default();
                if slots.is_empty() && !desc.optional {
                    return Err(FlowError::UnconnectedPort {
                        component: decl.wrapper.name().to_string(),
                        port: desc.name.to_string(),
                    });
                }
                check_contiguous(decl, desc, slots.keys())?;

                let mut ports = Vec::with_capacity(slots.len());
                for (index, source) in slots {
                    let address = address_of(id, desc, index);
                    let port = match source {
                        InputSource::Connection { capacity } => {
                            let port = Arc::new(BufferedInPort::new(
                                address,
                                Arc::clone(&decl.owner_name),
                                capacity,
                                Arc::downgrade(&decl.wrapper),
                                Arc::clone(&shared),
                            ));
                            buffered.insert((id, desc.name, index), Arc::clone(&port));
                            InputPort::Buffered(port)
                        }
                        InputSource::Seed { value, is_static } => InputPort::Seed(Arc::new(
                            SeedPort::new(
                                address,
                                Arc::clone(&decl.owner_name),
                                Arc::clone(&shared),
                                value,
                                is_static,
                            )?,
                        )),
                    };
                    ports.push(port);
                }

                let set = &mut sets[id.index()];
                if desc.is_array() {
                    set.insert_input_array(desc.name, ports);
                } else {
                    let port = ports.pop().unwrap_or_else(|| {
                        InputPort::Null(NullPort::new(PortAddress::single(id, desc.name)))
                    });
                    set.insert_input(desc.name, port);
                }
            }
        }

        // ── Output ports ──
        for decl in &declared {
            let id = decl.wrapper.id();
            for desc in decl
                .descriptors
                .iter()
                .filter(|d| d.direction == PortDirection::Output)
            {
                let slots = out_slots.remove(&(id, desc.name)).unwrap_or_default();
                check_contiguous(decl, desc, slots.keys())?;

                let mut ports = Vec::with_capacity(slots.len());
                for (index, target_key) in slots {
                    let target = buffered.get(&target_key).ok_or_else(|| FlowError::UnknownPort {
                        component: declared[target_key.0.index()].wrapper.name().to_string(),
                        port: target_key.1.to_string(),
                    })?;
                    let out = Arc::new(OutPort::new(
                        address_of(id, desc, index),
                        Arc::clone(&decl.owner_name),
                        Arc::clone(&shared),
                        Arc::clone(target),
                    ));
                    target.attach_upstream(&out);
                    ports.push(OutputPort::Connected(out));
                }

                let set = &mut sets[id.index()];
                if desc.is_array() {
                    set.insert_output_array(desc.name, ports);
                } else {
                    let port = ports.pop().unwrap_or_else(|| {
                        OutputPort::Null(NullPort::new(PortAddress::single(id, desc.name)))
                    });
                    set.insert_output(desc.name, port);
                }
            }
        }

        let wrappers: Vec<Arc<ComponentWrapper>> = declared
            .into_iter()
            .zip(sets)
            .map(|(decl, set)| {
                decl.wrapper.install_ports(set);
                decl.wrapper
            })
            .collect();

        tracing::debug!(
            network = %shared.id,
            components = wrappers.len(),
            connections = connections.len(),
            "network built"
        );
        Ok(Network::new(shared, wrappers, events_rx))
    }
}

fn tracers_for(config: &RuntimeConfig) -> Tracers {
    let mut tracers = Tracers::none();
    if config.trace_ports {
        tracers = tracers.with_port(Arc::new(LoggingTracer));
    }
    if config.trace_components {
        tracers = tracers
            .with_component(Arc::new(LoggingTracer))
            .with_network(Arc::new(LoggingTracer));
    }
    tracers
}

fn address_of(id: ComponentId, desc: &PortDescriptor, index: usize) -> PortAddress {
    if desc.is_array() {
        PortAddress::indexed(id, desc.name, index)
    } else {
        PortAddress::single(id, desc.name)
    }
}

/// Array slots must be exactly `0..n`.
fn check_contiguous<'a>(
    decl: &Declared,
    desc: &PortDescriptor,
    indices: impl Iterator<Item = &'a usize>,
) -> Result<()> {
    for (expected, &index) in indices.enumerate() {
        if index != expected {
            return Err(FlowError::PortIndexGap {
                component: decl.wrapper.name().to_string(),
                port: desc.name.to_string(),
                index: expected,
            });
        }
    }
    Ok(())
}
