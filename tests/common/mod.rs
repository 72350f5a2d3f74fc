//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod components;

use flownet::Packet;
use std::time::Duration;

/// Upper bound for a whole network run in tests
pub fn test_timeout() -> Duration {
    Duration::from_secs(10)
}

/// Run `f` on its own thread and fail the test if it does not return in time.
///
/// Keeps a broken termination protocol from hanging the test binary.
pub fn within_timeout<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::bounded(1);
    std::thread::spawn(move || {
        let _ = tx.send(f());
    });
    rx.recv_timeout(test_timeout())
        .expect("network run did not finish within the test timeout")
}

/// Integer payloads of a packet list; panics on anything else
pub fn ints(packets: &[Packet]) -> Vec<i64> {
    packets
        .iter()
        .map(|p| p.as_int().unwrap_or_else(|| panic!("expected Int packet, got {:?}", p)))
        .collect()
}
