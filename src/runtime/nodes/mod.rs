//! Built-in component implementations.

mod collector;
mod counter;
mod filter;
mod map;
mod merge;
mod printer;

pub use collector::{CollectedPackets, CollectorSink};
pub use counter::CounterSource;
pub use filter::FilterNode;
pub use map::MapNode;
pub use merge::MergeNode;
pub use printer::PrinterSink;

use crate::runtime::packet::Packet;
use crate::runtime::port::{InputPort, PortKind};

/// Receive every packet currently available on `input`, handing each to `f`.
///
/// Blocks only if called while the queue is empty and the upstream is open.
/// A seed port yields at most one packet per call, since a static seed
/// never runs dry. Returns `true` once the input has reached end of stream.
pub(crate) fn drain(input: &InputPort, mut f: impl FnMut(Packet)) -> bool {
    loop {
        match input.receive() {
            Some(packet) => f(packet),
            None => return input.is_closed(),
        }
        if input.kind() == PortKind::Seed || input.receive_would_block() {
            return input.is_closed();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::id::{ComponentId, PortAddress};
    use crate::runtime::port::{NullPort, SeedPort};
    use crate::runtime::shared::NetworkShared;
    use crate::runtime::tracer::Tracers;
    use crossbeam_channel::unbounded;
    use std::sync::Arc;

    fn seed(is_static: bool) -> InputPort {
        let (tx, _rx) = unbounded();
        let network = Arc::new(NetworkShared::new("test".into(), None, Tracers::none(), tx));
        let port = SeedPort::new(
            PortAddress::single(ComponentId(0), "start"),
            Arc::from("reader"),
            network,
            Some(Packet::Int(7)),
            is_static,
        )
        .unwrap();
        InputPort::Seed(Arc::new(port))
    }

    #[test]
    fn test_drain_static_seed_yields_once_per_call() {
        let input = seed(true);
        let mut seen = Vec::new();
        assert!(!drain(&input, |p| seen.push(p)));
        assert!(!drain(&input, |p| seen.push(p)));
        assert_eq!(seen, vec![Packet::Int(7), Packet::Int(7)]);
    }

    #[test]
    fn test_drain_one_shot_seed_reaches_end_of_stream() {
        let input = seed(false);
        let mut seen = Vec::new();
        assert!(drain(&input, |p| seen.push(p)));
        assert!(drain(&input, |p| seen.push(p)));
        assert_eq!(seen, vec![Packet::Int(7)]);
    }

    #[test]
    fn test_drain_null_port() {
        let input = InputPort::Null(NullPort::new(PortAddress::single(ComponentId(0), "opt")));
        assert!(drain(&input, |_| panic!("null port yielded a packet")));
    }
}
