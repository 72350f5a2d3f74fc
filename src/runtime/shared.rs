//! State shared between a network, its component threads and its ports.

use crate::runtime::id::ComponentId;
use crate::runtime::properties::Properties;
use crate::runtime::sync::{lock, read, write};
use crate::runtime::tracer::Tracers;
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

/// Reports from component threads to the network run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LifecycleEvent {
    /// All ports of the component are closed and its thread left the run loop.
    Finished(ComponentId),
    /// The component thread stopped because the network was terminated.
    Interrupted(ComponentId),
    /// `terminate()` was called; the run loop must stop waiting.
    Terminated,
}

pub(crate) struct NetworkShared {
    pub id: String,
    pub thread_stack_size: Option<usize>,
    pub network_properties: Properties,
    pub runtime_properties: Properties,
    tracers: RwLock<Tracers>,
    one_time: AtomicBool,
    events: Sender<LifecycleEvent>,
    /// Dropping the sender disconnects `shutdown`, which every blocking wait
    /// in the runtime selects on.
    shutdown_guard: Mutex<Option<Sender<()>>>,
    shutdown: Receiver<()>,
}

impl NetworkShared {
    pub fn new(
        id: String,
        thread_stack_size: Option<usize>,
        tracers: Tracers,
        events: Sender<LifecycleEvent>,
    ) -> Self {
        let (guard, shutdown) = bounded(0);
        Self {
            id,
            thread_stack_size,
            network_properties: Properties::new(),
            runtime_properties: Properties::new(),
            tracers: RwLock::new(tracers),
            one_time: AtomicBool::new(false),
            events,
            shutdown_guard: Mutex::new(Some(guard)),
            shutdown,
        }
    }

    pub fn tracers(&self) -> Tracers {
        read(&self.tracers).clone()
    }

    pub fn set_tracers(&self, tracers: Tracers) {
        *write(&self.tracers) = tracers;
    }

    pub fn is_one_time(&self) -> bool {
        self.one_time.load(Ordering::SeqCst)
    }

    pub fn set_one_time(&self, one_time: bool) {
        self.one_time.store(one_time, Ordering::SeqCst);
    }

    pub fn report(&self, event: LifecycleEvent) {
        // The network owns the receiver for its whole life; a send error only
        // happens during teardown, when nobody is listening anyway.
        let _ = self.events.send(event);
    }

    /// Receiver that disconnects once the network is terminated.
    pub fn shutdown(&self) -> &Receiver<()> {
        &self.shutdown
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self.shutdown.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Fire the shutdown signal. Idempotent.
    pub fn interrupt(&self) {
        lock(&self.shutdown_guard).take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::time::Duration;

    fn shared() -> (NetworkShared, Receiver<LifecycleEvent>) {
        let (tx, rx) = unbounded();
        (NetworkShared::new("net".into(), None, Tracers::none(), tx), rx)
    }

    #[test]
    fn test_interrupt_disconnects_shutdown() {
        let (shared, _rx) = shared();
        assert!(!shared.is_interrupted());
        assert!(shared
            .shutdown()
            .recv_timeout(Duration::from_millis(10))
            .is_err());

        shared.interrupt();
        shared.interrupt();
        assert!(shared.is_interrupted());
        assert!(matches!(
            shared.shutdown().recv_timeout(Duration::from_secs(1)),
            Err(crossbeam_channel::RecvTimeoutError::Disconnected)
        ));
    }

    #[test]
    fn test_report_reaches_receiver() {
        let (shared, rx) = shared();
        shared.report(LifecycleEvent::Finished(ComponentId(4)));
        assert_eq!(rx.try_recv(), Ok(LifecycleEvent::Finished(ComponentId(4))));
    }
}
