//! Network: owns the component wrappers and drives a run to completion.
//!
//! A run starts every component that can make progress on its own, then
//! waits for finish reports. Each report feeds the termination cascade: the
//! finished component's downstream neighbours are checked, and any neighbour
//! whose inputs can never deliver another packet is closed and finished
//! too. The run is over once every component has finished.
//!
//! ```text
//! one-time:    Initialized ─► Started ─► Terminated
//! continuous:  Initialized ─► Started ─► Resetted ─► Started … ─► Terminated
//! ```

use crate::error::{FlowError, Result};
use crate::runtime::component::ComponentState;
use crate::runtime::id::ComponentId;
use crate::runtime::packet::Packet;
use crate::runtime::port::OutputPort;
use crate::runtime::properties::Properties;
use crate::runtime::shared::{LifecycleEvent, NetworkShared};
use crate::runtime::sync::lock;
use crate::runtime::tracer::Tracers;
use crate::runtime::wrapper::ComponentWrapper;
use crossbeam_channel::Receiver;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, info_span, warn};

/// Network lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkState {
    Initialized,
    Started,
    Resetted,
    Terminated,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every component finished.
    Completed,
    /// `terminate()` was called while the run was in progress.
    Terminated,
}

struct NetworkInner {
    shared: Arc<NetworkShared>,
    components: Vec<Arc<ComponentWrapper>>,
    events: Receiver<LifecycleEvent>,
    state: Mutex<NetworkState>,
    running: AtomicBool,
}

/// A runnable network of components.
///
/// Dropping a network that was not terminated terminates it, so no
/// component thread outlives it.
pub struct Network {
    inner: Arc<NetworkInner>,
}

/// Cloneable handle for observing or terminating a network from another
/// thread while it runs.
#[derive(Clone)]
pub struct NetworkHandle {
    inner: Arc<NetworkInner>,
}

impl Network {
    pub(crate) fn new(
        shared: Arc<NetworkShared>,
        components: Vec<Arc<ComponentWrapper>>,
        events: Receiver<LifecycleEvent>,
    ) -> Self {
        Self {
            inner: Arc::new(NetworkInner {
                shared,
                components,
                events,
                state: Mutex::new(NetworkState::Initialized),
                running: AtomicBool::new(false),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.shared.id
    }

    pub fn state(&self) -> NetworkState {
        self.inner.state()
    }

    pub fn is_one_time(&self) -> bool {
        self.inner.shared.is_one_time()
    }

    pub fn handle(&self) -> NetworkHandle {
        NetworkHandle {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn components(&self) -> &[Arc<ComponentWrapper>] {
        &self.inner.components
    }

    /// Look up a component by the name it was given in the description.
    pub fn component(&self, name: &str) -> Option<&Arc<ComponentWrapper>> {
        self.inner.components.iter().find(|c| c.name() == name)
    }

    pub fn network_properties(&self) -> &Properties {
        &self.inner.shared.network_properties
    }

    pub fn runtime_properties(&self) -> &Properties {
        &self.inner.shared.runtime_properties
    }

    /// Components can read runtime properties but not change them.
    pub fn set_runtime_property(&self, key: impl Into<String>, value: impl Into<Packet>) {
        self.inner.shared.runtime_properties.set(key, value);
    }

    /// Replace the attached tracers. Takes effect for subsequent events.
    pub fn set_tracers(&self, tracers: Tracers) {
        self.inner.shared.set_tracers(tracers);
    }

    /// Run once in one-time mode and tear the network down.
    pub fn start_and_terminate(&self) -> Result<RunOutcome> {
        if self.state() != NetworkState::Initialized {
            return Err(FlowError::NetworkState(
                "A terminated network cannot be started again.".into(),
            ));
        }
        self.inner.shared.set_one_time(true);
        let outcome = self.inner.run_network()?;
        self.inner.set_state(NetworkState::Terminated);
        self.inner.join_all();
        Ok(outcome)
    }

    /// Run in continuous mode. The first call runs the freshly built
    /// network; every later call resets it first. Component threads are kept
    /// parked between runs.
    pub fn start(&self) -> Result<RunOutcome> {
        match self.state() {
            NetworkState::Initialized => self.inner.shared.set_one_time(false),
            NetworkState::Terminated => {
                return Err(FlowError::NetworkState(
                    "A terminated network cannot be started again.".into(),
                ))
            }
            _ if self.is_one_time() => {
                return Err(FlowError::NetworkState(
                    "A terminated network cannot be started again.".into(),
                ))
            }
            _ => self.reset()?,
        }
        let outcome = self.inner.run_network()?;
        if outcome == RunOutcome::Completed {
            self.inner.set_state(NetworkState::Resetted);
        }
        Ok(outcome)
    }

    /// One run without any mode bookkeeping. Most callers want `start` or
    /// `start_and_terminate`.
    pub fn run_network(&self) -> Result<RunOutcome> {
        self.inner.run_network()
    }

    /// Reset every component and port for another run.
    pub fn reset(&self) -> Result<()> {
        self.inner.reset()
    }

    /// Close all output ports, terminate every component and wait for their
    /// threads. Idempotent.
    pub fn terminate(&self) {
        self.inner.terminate();
    }
}

impl Drop for Network {
    fn drop(&mut self) {
        if self.inner.state() != NetworkState::Terminated {
            self.inner.terminate();
        }
    }
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("id", &self.id())
            .field("state", &self.state())
            .field("components", &self.inner.components.len())
            .finish()
    }
}

impl NetworkHandle {
    pub fn id(&self) -> &str {
        &self.inner.shared.id
    }

    pub fn state(&self) -> NetworkState {
        self.inner.state()
    }

    pub fn network_properties(&self) -> &Properties {
        &self.inner.shared.network_properties
    }

    pub fn terminate(&self) {
        self.inner.terminate();
    }
}

impl NetworkInner {
    fn state(&self) -> NetworkState {
        *lock(&self.state)
    }

    fn set_state(&self, next: NetworkState) {
        *lock(&self.state) = next;
        if let Some(tracer) = self.shared.tracers().network {
            tracer.on_state_change(&self.shared.id, next);
        }
    }

    fn begin_run(&self) -> Result<()> {
        let mut state = lock(&self.state);
        if *state == NetworkState::Terminated {
            return Err(FlowError::NetworkState(
                "A terminated network cannot be started again.".into(),
            ));
        }
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(FlowError::NetworkState("network is already running".into()));
        }
        *state = NetworkState::Started;
        drop(state);
        if let Some(tracer) = self.shared.tracers().network {
            tracer.on_state_change(&self.shared.id, NetworkState::Started);
        }
        Ok(())
    }

    fn run_network(&self) -> Result<RunOutcome> {
        let span = info_span!("network", id = %self.shared.id);
        let _enter = span.enter();

        // Reports left over from an earlier run or a terminated one.
        while self.events.try_recv().is_ok() {}
        self.begin_run()?;
        let outcome = self.drive();
        self.running.store(false, Ordering::SeqCst);
        outcome
    }

    fn drive(&self) -> Result<RunOutcome> {
        let mut unfinished: HashSet<ComponentId> = self.components.iter().map(|c| c.id()).collect();
        let mut backlog: VecDeque<ComponentId> = VecDeque::new();
        info!(
            components = self.components.len(),
            one_time = self.shared.is_one_time(),
            "network started"
        );

        for component in &self.components {
            if component.is_active() || !component.has_buffered_inputs() {
                component.start_if_idle()?;
            }
        }

        while !unfinished.is_empty() {
            let event = self.events.recv().map_err(|_| {
                FlowError::NetworkState("lifecycle event channel disconnected".into())
            })?;
            if self.enqueue(event, &mut backlog) {
                info!("run terminated");
                return Ok(RunOutcome::Terminated);
            }
            // Drain everything already reported before cascading.
            while let Ok(event) = self.events.try_recv() {
                if self.enqueue(event, &mut backlog) {
                    info!("run terminated");
                    return Ok(RunOutcome::Terminated);
                }
            }
            self.cascade(&mut unfinished, &mut backlog);
        }

        info!("all components finished");
        Ok(RunOutcome::Completed)
    }

    /// Returns `true` if the run must stop.
    fn enqueue(&self, event: LifecycleEvent, backlog: &mut VecDeque<ComponentId>) -> bool {
        match event {
            LifecycleEvent::Finished(id) => {
                backlog.push_back(id);
                false
            }
            LifecycleEvent::Interrupted(id) => {
                debug!(component = %id, "component interrupted");
                false
            }
            LifecycleEvent::Terminated => true,
        }
    }

    // ── Termination cascade ──

    fn cascade(&self, unfinished: &mut HashSet<ComponentId>, backlog: &mut VecDeque<ComponentId>) {
        while let Some(id) = backlog.pop_front() {
            if !unfinished.remove(&id) {
                error!("{}", FlowError::UnknownFinishedComponent(id));
                break;
            }
            let Some(component) = self.components.get(id.index()) else {
                error!("{}", FlowError::UnknownFinishedComponent(id));
                break;
            };
            debug!(component = component.name(), "finished");
            component.finish();
            if self.shared.is_one_time() {
                component.terminate();
            }

            for out in component.ports().outputs().iter().filter_map(OutputPort::as_connected) {
                let neighbour_id = out.target().address().component;
                if !unfinished.contains(&neighbour_id) || backlog.contains(&neighbour_id) {
                    continue;
                }
                let Some(neighbour) = self.components.get(neighbour_id.index()) else {
                    continue;
                };
                // Token first: a thread consumes it only after turning Active.
                let wake_pending = neighbour.has_pending_wake();
                if neighbour.state() == ComponentState::Active || wake_pending {
                    continue;
                }
                if !neighbour.inputs_exhausted() {
                    continue;
                }
                // The state may have moved since it was read: a last packet
                // from another upstream can start the neighbour in between.
                if neighbour.claim_idle() {
                    debug!(component = neighbour.name(), "inputs exhausted, closing");
                    neighbour.close_all_ports();
                    backlog.push_back(neighbour_id);
                    continue;
                }
                let state = neighbour.state();
                if state == ComponentState::Inactive {
                    warn!(
                        component = neighbour.name(),
                        ?state,
                        "possible deadlock: component is idle with exhausted inputs \
                         but has not closed its ports"
                    );
                }
            }
        }
    }

    // ── Reset / terminate ──

    fn reset(&self) -> Result<()> {
        match self.state() {
            NetworkState::Terminated => Err(FlowError::NetworkState(
                "a terminated network cannot be reset".into(),
            )),
            _ if self.running.load(Ordering::SeqCst) => Err(FlowError::NetworkState(
                "cannot reset a running network".into(),
            )),
            _ => {
                debug!(network = %self.shared.id, "resetting network");
                self.components.iter().for_each(|c| c.reset());
                Ok(())
            }
        }
    }

    fn terminate(&self) {
        {
            let state = lock(&self.state);
            if *state == NetworkState::Terminated && !self.running.load(Ordering::SeqCst) {
                // Still join: a one-time run may have left exited threads.
                drop(state);
                self.join_all();
                return;
            }
        }
        info!(network = %self.shared.id, "terminating network");

        self.components.iter().for_each(|c| c.close_all_out_ports());
        self.shared.interrupt();
        self.components.iter().for_each(|c| c.terminate());
        self.set_state(NetworkState::Terminated);
        self.shared.report(LifecycleEvent::Terminated);
        self.join_all();
    }

    fn join_all(&self) {
        self.components.iter().for_each(|c| c.join());
    }
}
