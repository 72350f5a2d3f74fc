//! Graph description consumed by `NetworkFactory`.
//!
//! A description is plain data: named component instances, connections
//! from output slots to input slots (with optional capacity) and seed values
//! for input slots. It is expected to be valid already; the factory only
//! rejects what would make instantiation impossible.

use crate::error::FlowError;
use crate::runtime::component::Component;
use crate::runtime::packet::Packet;
use std::fmt;
use std::str::FromStr;

/// Reference to a port slot by component name, port name and array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortRef {
    pub component: String,
    pub port: String,
    pub index: Option<usize>,
}

impl PortRef {
    pub fn new(component: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            port: port.into(),
            index: None,
        }
    }

    pub fn at(component: impl Into<String>, port: impl Into<String>, index: usize) -> Self {
        Self {
            component: component.into(),
            port: port.into(),
            index: Some(index),
        }
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}.{}[{}]", self.component, self.port, i),
            None => write!(f, "{}.{}", self.component, self.port),
        }
    }
}

/// Parses `component.port` or `component.port[index]`.
impl FromStr for PortRef {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FlowError::InvalidPortRef(s.to_string());
        let (component, rest) = s.split_once('.').ok_or_else(invalid)?;
        let (port, index) = match rest.split_once('[') {
            Some((port, tail)) => {
                let digits = tail.strip_suffix(']').ok_or_else(invalid)?;
                (port, Some(digits.parse::<usize>().map_err(|_| invalid())?))
            }
            None => (rest, None),
        };
        if component.is_empty() || port.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            component: component.to_string(),
            port: port.to_string(),
            index,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Connection {
    pub from: PortRef,
    pub to: PortRef,
    /// Queue capacity; the configured default when `None`.
    pub capacity: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Seed {
    pub to: PortRef,
    pub value: Option<Packet>,
    pub is_static: bool,
}

pub struct ComponentEntry {
    pub name: String,
    pub logic: Box<dyn Component>,
}

impl fmt::Debug for ComponentEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentEntry")
            .field("name", &self.name)
            .field("type", &self.logic.type_name())
            .finish()
    }
}

/// Components, connections and seeds of a network.
#[derive(Debug, Default)]
pub struct NetworkDescription {
    pub components: Vec<ComponentEntry>,
    pub connections: Vec<Connection>,
    pub seeds: Vec<Seed>,
}

impl NetworkDescription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_component(
        &mut self,
        name: impl Into<String>,
        logic: impl Component + 'static,
    ) -> &mut Self {
        self.components.push(ComponentEntry {
            name: name.into(),
            logic: Box::new(logic),
        });
        self
    }

    /// Connect with the default capacity.
    pub fn connect(&mut self, from: PortRef, to: PortRef) -> &mut Self {
        self.connections.push(Connection {
            from,
            to,
            capacity: None,
        });
        self
    }

    pub fn connect_with_capacity(&mut self, from: PortRef, to: PortRef, capacity: usize) -> &mut Self {
        self.connections.push(Connection {
            from,
            to,
            capacity: Some(capacity),
        });
        self
    }

    /// One-shot seed: delivered once, then the port closes.
    pub fn seed(&mut self, to: PortRef, value: impl Into<Packet>) -> &mut Self {
        self.seeds.push(Seed {
            to,
            value: Some(value.into()),
            is_static: false,
        });
        self
    }

    /// Static seed: delivered on every receive, never closes.
    pub fn seed_static(&mut self, to: PortRef, value: impl Into<Packet>) -> &mut Self {
        self.seeds.push(Seed {
            to,
            value: Some(value.into()),
            is_static: true,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port_ref() {
        let single: PortRef = "reader.out".parse().unwrap();
        assert_eq!(single, PortRef::new("reader", "out"));

        let indexed: PortRef = "merge.in[2]".parse().unwrap();
        assert_eq!(indexed, PortRef::at("merge", "in", 2));
        assert_eq!(indexed.to_string(), "merge.in[2]");
    }

    #[test]
    fn test_parse_port_ref_rejects_malformed() {
        for bad in ["reader", ".out", "reader.", "merge.in[x]", "merge.in[1"] {
            assert!(
                matches!(bad.parse::<PortRef>(), Err(FlowError::InvalidPortRef(_))),
                "{} should not parse",
                bad
            );
        }
    }
}
