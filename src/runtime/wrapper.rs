//! Component wrapper: binds user logic to an identity, a port set, a
//! lifecycle state and one dedicated thread.
//!
//! # Thread body
//!
//! ```text
//! loop {                                 // outer: one iteration per network run
//!     loop {                             // inner: one iteration per step
//!         state = Active; on_execute()
//!         all ports closed?   → report Finished, break
//!         inputs live+empty?  → state = Inactive, wait for wake token
//!     }
//!     one-time mode?          → exit
//!     park until resumed or terminated
//! }
//! ```
//!
//! Wake-ups are coalescing tokens on bounded(1) channels: a packet arriving
//! between the emptiness check and the wait leaves a token behind, so the
//! wait returns immediately instead of missing it.

use crate::error::{FlowError, Result};
use crate::runtime::component::{Component, ComponentContext, ComponentState, ComponentType};
use crate::runtime::id::ComponentId;
use crate::runtime::port::{InputPort, OutputPort, PortSet};
use crate::runtime::properties::Properties;
use crate::runtime::shared::{LifecycleEvent, NetworkShared};
use crate::runtime::sync::lock;
use crossbeam_channel::{bounded, select, Receiver, Sender};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::{self, JoinHandle, ThreadId};
use tracing::{debug, error, info_span, warn};

pub struct ComponentWrapper {
    id: ComponentId,
    name: String,
    component_type: ComponentType,
    network: Arc<NetworkShared>,
    logic: Mutex<Box<dyn Component>>,
    /// Thread currently inside `logic`, if any.
    logic_holder: Mutex<Option<ThreadId>>,
    /// `on_terminate` was requested from inside a step or hook.
    terminate_pending: AtomicBool,
    ports: OnceLock<PortSet>,
    properties: Properties,
    state: Mutex<ComponentState>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
    resume_tx: Sender<()>,
    resume_rx: Receiver<()>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl ComponentWrapper {
    pub(crate) fn new(
        id: ComponentId,
        name: impl Into<String>,
        logic: Box<dyn Component>,
        network: Arc<NetworkShared>,
    ) -> Self {
        let component_type = ComponentType {
            name: logic.type_name().to_string(),
            active: logic.is_active(),
        };
        let (wake_tx, wake_rx) = bounded(1);
        let (resume_tx, resume_rx) = bounded(1);
        Self {
            id,
            name: name.into(),
            component_type,
            network,
            logic: Mutex::new(logic),
            logic_holder: Mutex::new(None),
            terminate_pending: AtomicBool::new(false),
            ports: OnceLock::new(),
            properties: Properties::new(),
            state: Mutex::new(ComponentState::Initialized),
            wake_tx,
            wake_rx,
            resume_tx,
            resume_rx,
            thread: Mutex::new(None),
        }
    }

    /// Install the resolved ports. Only the first call has an effect.
    pub(crate) fn install_ports(&self, ports: PortSet) {
        if self.ports.set(ports).is_err() {
            warn!(component = %self.name, "ports already installed");
        }
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn component_type(&self) -> &ComponentType {
        &self.component_type
    }

    pub fn is_active(&self) -> bool {
        self.component_type.active
    }

    pub fn ports(&self) -> &PortSet {
        self.ports.get_or_init(PortSet::new)
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn state(&self) -> ComponentState {
        *lock(&self.state)
    }

    pub(crate) fn network_id(&self) -> &str {
        &self.network.id
    }

    pub(crate) fn network_properties(&self) -> &Properties {
        &self.network.network_properties
    }

    pub(crate) fn runtime_properties(&self) -> &Properties {
        &self.network.runtime_properties
    }

    pub(crate) fn is_interrupted(&self) -> bool {
        self.network.is_interrupted()
    }

    /// Whether any input slot is fed by another component.
    pub fn has_buffered_inputs(&self) -> bool {
        self.ports().inputs().iter().any(|p| p.as_buffered().is_some())
    }

    /// Some connected input is still open, empty, and its upstream open, so
    /// more data may arrive.
    fn keep_alive(&self) -> bool {
        self.ports()
            .inputs()
            .iter()
            .filter_map(InputPort::as_buffered)
            .any(|p| !p.is_closed() && p.packet_count() == 0 && !p.is_upstream_closed())
    }

    fn has_pending_input(&self) -> bool {
        self.ports()
            .inputs()
            .iter()
            .filter_map(InputPort::as_buffered)
            .any(|p| p.packet_count() > 0)
    }

    /// Every connected input has a closed upstream and is closed or empty:
    /// no data is left and none can arrive.
    pub(crate) fn inputs_exhausted(&self) -> bool {
        self.ports()
            .inputs()
            .iter()
            .filter_map(InputPort::as_buffered)
            .all(|p| p.is_upstream_closed() && (p.is_closed() || p.packet_count() == 0))
    }

    pub(crate) fn close_all_ports(&self) {
        self.ports().inputs().iter().for_each(InputPort::close);
        self.close_all_out_ports();
    }

    pub(crate) fn close_all_out_ports(&self) {
        self.ports().outputs().iter().for_each(OutputPort::close);
    }

    // ── State transitions ──────────────────────────────────────────────

    fn transition(&self, state: &mut ComponentState, next: ComponentState) {
        *state = next;
        if let Some(tracer) = self.network.tracers().component {
            tracer.on_state_change(&self.name, self.id, next);
        }
    }

    pub(crate) fn set_state(&self, next: ComponentState) {
        let mut state = lock(&self.state);
        self.transition(&mut state, next);
    }

    /// Start the thread from `Initialized`, or resume the parked thread from
    /// `Resetted`. Any other state is a programming error.
    pub fn run_component(self: &Arc<Self>) -> Result<()> {
        let mut state = lock(&self.state);
        self.start_locked(&mut state)
    }

    /// Like `run_component`, but a component that is already running is left
    /// alone.
    pub(crate) fn start_if_idle(self: &Arc<Self>) -> Result<()> {
        let mut state = lock(&self.state);
        match *state {
            ComponentState::Initialized | ComponentState::Resetted => self.start_locked(&mut state),
            _ => Ok(()),
        }
    }

    fn start_locked(self: &Arc<Self>, state: &mut ComponentState) -> Result<()> {
        let previous = *state;
        if !matches!(
            previous,
            ComponentState::Initialized | ComponentState::Resetted
        ) {
            return Err(FlowError::InvalidState {
                component: self.name.clone(),
                state: previous,
            });
        }
        self.transition(state, ComponentState::Active);

        // A component closed by the cascade in an earlier run never had a
        // thread, so `Resetted` does not imply a parked thread.
        let has_thread = lock(&self.thread).is_some();
        if has_thread {
            let _ = self.resume_tx.try_send(());
        } else if let Err(err) = self.spawn() {
            self.transition(state, previous);
            return Err(err);
        }
        Ok(())
    }

    /// A packet was queued on one of our inputs.
    pub(crate) fn notify_packet(self: &Arc<Self>) {
        let mut state = lock(&self.state);
        match *state {
            ComponentState::Initialized | ComponentState::Resetted => {
                if let Err(err) = self.start_locked(&mut state) {
                    error!(component = %self.name, error = %err, "failed to start component");
                }
            }
            ComponentState::Active | ComponentState::Inactive => {
                let _ = self.wake_tx.try_send(());
            }
            ComponentState::Finished | ComponentState::Terminated => {}
        }
    }

    /// Nudge the thread if it is running, so it re-evaluates its inputs.
    pub(crate) fn wake(&self) {
        if matches!(
            self.state(),
            ComponentState::Active | ComponentState::Inactive
        ) {
            let _ = self.wake_tx.try_send(());
        }
    }

    /// A wake token is queued that the thread has not consumed yet.
    pub(crate) fn has_pending_wake(&self) -> bool {
        !self.wake_rx.is_empty()
    }

    pub(crate) fn finish(&self) {
        self.call_hook("finish", |logic| logic.on_finish());
        let mut state = lock(&self.state);
        if *state != ComponentState::Finished {
            self.transition(&mut state, ComponentState::Finished);
        }
    }

    /// Claim a component that never ran in this run so the cascade can close
    /// it. A claimed component is `Finished` and can no longer be started by
    /// an arriving packet. The caller closes the ports afterwards, outside
    /// the state lock.
    pub(crate) fn claim_idle(&self) -> bool {
        let mut state = lock(&self.state);
        match *state {
            ComponentState::Initialized | ComponentState::Resetted => {
                self.transition(&mut state, ComponentState::Finished);
                true
            }
            ComponentState::Terminated => true,
            ComponentState::Active | ComponentState::Inactive | ComponentState::Finished => false,
        }
    }

    /// Prepare for another run. Ports are always reset; the hook only runs
    /// if the component ever left `Initialized`.
    pub(crate) fn reset(&self) {
        if self.state() != ComponentState::Initialized {
            self.call_hook("reset", |logic| logic.on_reset());
            self.set_state(ComponentState::Resetted);
        }
        while self.wake_rx.try_recv().is_ok() {}
        let ports = self.ports();
        ports.inputs().iter().for_each(InputPort::reset);
        ports.outputs().iter().for_each(OutputPort::reset);
    }

    /// Idempotent. Called from inside this component's own step or hook, the
    /// `on_terminate` hook runs once that call returns.
    pub(crate) fn terminate(&self) {
        if self.state() == ComponentState::Terminated {
            return;
        }
        if self.holds_logic() {
            self.terminate_pending.store(true, Ordering::SeqCst);
        } else {
            self.call_hook("terminate", |logic| logic.on_terminate());
        }
        self.set_state(ComponentState::Terminated);
        let _ = self.resume_tx.try_send(());
    }

    /// Wait for the component thread to exit, if one was started.
    pub(crate) fn join(&self) {
        let handle = {
            let mut slot = lock(&self.thread);
            // Our own thread: leave the handle for whoever joins later.
            if slot
                .as_ref()
                .is_some_and(|h| h.thread().id() == thread::current().id())
            {
                return;
            }
            match slot.take() {
                Some(handle) => handle,
                None => return,
            }
        };
        if handle.join().is_err() {
            warn!(component = %self.name, "component thread panicked");
        }
    }

    // ── Thread ─────────────────────────────────────────────────────────

    fn spawn(self: &Arc<Self>) -> Result<()> {
        let mut builder =
            thread::Builder::new().name(format!("[{}] {}", self.component_type.name, self.name));
        if let Some(size) = self.network.thread_stack_size {
            builder = builder.stack_size(size);
        }
        let this = Arc::clone(self);
        let handle = builder
            .spawn(move || this.thread_main())
            .map_err(|source| FlowError::ThreadSpawn {
                component: self.name.clone(),
                source,
            })?;
        *lock(&self.thread) = Some(handle);
        Ok(())
    }

    fn thread_main(self: Arc<Self>) {
        let span = info_span!("component", network = %self.network.id, name = %self.name);
        let _enter = span.enter();
        debug!(kind = %self.component_type.name, "thread started");

        let ctx = ComponentContext::new(&self);
        loop {
            if !self.run_until_finished(&ctx) {
                break;
            }
            if self.network.is_one_time() {
                break;
            }
            if !self.park() {
                break;
            }
        }
        debug!("thread exiting");
    }

    /// Inner loop. Returns `false` when the thread must exit.
    fn run_until_finished(&self, ctx: &ComponentContext<'_>) -> bool {
        loop {
            if !self.begin_step() {
                return false;
            }
            self.execute(ctx);

            if self.network.is_interrupted() {
                debug!("interrupted during step");
                self.network.report(LifecycleEvent::Interrupted(self.id));
                return false;
            }
            if self.ports().all_closed() {
                self.network.report(LifecycleEvent::Finished(self.id));
                return true;
            }
            if self.keep_alive() && !self.has_pending_input() {
                if !self.go_idle() {
                    return false;
                }
                select! {
                    recv(self.wake_rx) -> _ => {}
                    recv(self.network.shutdown()) -> _ => {}
                }
                if self.network.is_interrupted() {
                    debug!("interrupted while idle");
                    self.network.report(LifecycleEvent::Interrupted(self.id));
                    return false;
                }
            }
        }
    }

    fn begin_step(&self) -> bool {
        let mut state = lock(&self.state);
        if *state == ComponentState::Terminated {
            return false;
        }
        if *state != ComponentState::Active {
            self.transition(&mut state, ComponentState::Active);
        }
        while self.wake_rx.try_recv().is_ok() {}
        true
    }

    fn go_idle(&self) -> bool {
        let mut state = lock(&self.state);
        if *state == ComponentState::Terminated {
            return false;
        }
        self.transition(&mut state, ComponentState::Inactive);
        true
    }

    /// Park between runs in continuous mode. Returns `false` on terminate.
    fn park(&self) -> bool {
        select! {
            recv(self.resume_rx) -> _ => {}
            recv(self.network.shutdown()) -> _ => {}
        }
        self.state() != ComponentState::Terminated && !self.network.is_interrupted()
    }

    fn holds_logic(&self) -> bool {
        *lock(&self.logic_holder) == Some(thread::current().id())
    }

    /// Run `f` with the logic locked, then any `on_terminate` it requested.
    /// `f` must not unwind.
    fn with_logic<R>(&self, f: impl FnOnce(&mut dyn Component) -> R) -> R {
        let result = {
            let mut logic = lock(&self.logic);
            *lock(&self.logic_holder) = Some(thread::current().id());
            let result = f(logic.as_mut());
            *lock(&self.logic_holder) = None;
            result
        };
        if self.terminate_pending.swap(false, Ordering::SeqCst) {
            self.call_hook("terminate", |logic| logic.on_terminate());
        }
        result
    }

    fn execute(&self, ctx: &ComponentContext<'_>) {
        let outcome =
            self.with_logic(|logic| panic::catch_unwind(AssertUnwindSafe(|| logic.on_execute(ctx))));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                error!(error = format!("{:#}", err), "uncaught error in component step");
            }
            Err(payload) => {
                error!(panic = panic_message(&*payload), "component step panicked");
            }
        }
    }

    fn call_hook(&self, hook: &str, f: impl FnOnce(&mut dyn Component)) {
        self.call_hook_dyn(hook, Box::new(f));
    }

    fn call_hook_dyn(&self, hook: &str, f: Box<dyn FnOnce(&mut dyn Component) + '_>) {
        let outcome = self.with_logic(|logic| panic::catch_unwind(AssertUnwindSafe(|| f(logic))));
        if let Err(payload) = outcome {
            error!(
                component = %self.name,
                hook,
                panic = panic_message(&*payload),
                "component hook panicked"
            );
        }
    }
}

impl std::fmt::Debug for ComponentWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentWrapper")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type", &self.component_type.name)
            .field("state", &self.state())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic payload"
    }
}
