//! Identity types for the runtime.
//!
//! `ComponentId` is a newtype over `u32` that serves as a direct index into
//! the network's component vector, giving O(1) lookup from a port back to the
//! wrapper that owns it.

use std::fmt;

/// Index into `Network::components`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ComponentId(pub u32);

impl ComponentId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({})", self.0)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Address of one port slot: owning component, port name and array index.
///
/// `index` is `None` for single (non-array) ports.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PortAddress {
    pub component: ComponentId,
    pub name: String,
    pub index: Option<usize>,
}

impl PortAddress {
    pub fn single(component: ComponentId, name: impl Into<String>) -> Self {
        Self {
            component,
            name: name.into(),
            index: None,
        }
    }

    pub fn indexed(component: ComponentId, name: impl Into<String>, index: usize) -> Self {
        Self {
            component,
            name: name.into(),
            index: Some(index),
        }
    }
}

impl fmt::Debug for PortAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}.{}[{}]", self.component.0, self.name, i),
            None => write!(f, "{}.{}", self.component.0, self.name),
        }
    }
}

impl fmt::Display for PortAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
