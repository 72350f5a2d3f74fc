//! Stand-in for an optional port left unconnected.

use crate::runtime::id::PortAddress;

/// Always closed, zero capacity, never yields or accepts anything.
#[derive(Debug, Clone)]
pub struct NullPort {
    address: PortAddress,
}

impl NullPort {
    pub(crate) fn new(address: PortAddress) -> Self {
        Self { address }
    }

    pub fn address(&self) -> &PortAddress {
        &self.address
    }
}
