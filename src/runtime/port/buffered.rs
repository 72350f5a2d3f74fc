//! Buffered input port: the only port kind that owns a queue.
//!
//! The queue is a bounded crossbeam channel. Two extra zero-capacity channels
//! act as one-shot signals: dropping `eof_guard` wakes a reader once the
//! upstream output port is closed, dropping `close_guard` wakes both readers
//! and writers once this port itself is closed. Every blocking operation
//! also selects on the network shutdown receiver so `terminate()` can break
//! any wait.

use crate::runtime::id::PortAddress;
use crate::runtime::packet::Packet;
use crate::runtime::port::output::OutPort;
use crate::runtime::shared::NetworkShared;
use crate::runtime::sync::{read, write};
use crate::runtime::wrapper::ComponentWrapper;
use crossbeam_channel::{bounded, select, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, RwLock, Weak};
use tracing::{debug, trace};

struct Mailbox {
    tx: Sender<Packet>,
    rx: Receiver<Packet>,
    eof_guard: Option<Sender<()>>,
    eof: Receiver<()>,
    close_guard: Option<Sender<()>>,
    closed: Receiver<()>,
}

impl Mailbox {
    fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        let (eof_guard, eof) = bounded(0);
        let (close_guard, closed) = bounded(0);
        Self {
            tx,
            rx,
            eof_guard: Some(eof_guard),
            eof,
            close_guard: Some(close_guard),
            closed,
        }
    }
}

pub struct BufferedInPort {
    address: PortAddress,
    owner_name: Arc<str>,
    capacity: usize,
    owner: Weak<ComponentWrapper>,
    network: Arc<NetworkShared>,
    upstream: OnceLock<Weak<OutPort>>,
    mailbox: RwLock<Mailbox>,
    closed: AtomicBool,
    upstream_closed: AtomicBool,
}

impl BufferedInPort {
    pub(crate) fn new(
        address: PortAddress,
        owner_name: Arc<str>,
        capacity: usize,
        owner: Weak<ComponentWrapper>,
        network: Arc<NetworkShared>,
    ) -> Self {
        Self {
            address,
            owner_name,
            capacity,
            owner,
            network,
            upstream: OnceLock::new(),
            mailbox: RwLock::new(Mailbox::new(capacity)),
            closed: AtomicBool::new(false),
            upstream_closed: AtomicBool::new(false),
        }
    }

    /// Pair this port with the output port that feeds it. Set once at build.
    pub(crate) fn attach_upstream(&self, upstream: &Arc<OutPort>) {
        let _ = self.upstream.set(Arc::downgrade(upstream));
    }

    pub fn address(&self) -> &PortAddress {
        &self.address
    }

    pub fn name(&self) -> &str {
        &self.address.name
    }

    pub fn index(&self) -> Option<usize> {
        self.address.index
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn packet_count(&self) -> usize {
        if self.is_closed() {
            return 0;
        }
        read(&self.mailbox).rx.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Whether the paired output port has been closed.
    pub fn is_upstream_closed(&self) -> bool {
        if self.upstream_closed.load(Ordering::SeqCst) {
            return true;
        }
        self.upstream
            .get()
            .and_then(Weak::upgrade)
            .map_or(true, |out| out.is_closed())
    }

    /// True iff the queue is currently empty.
    pub fn receive_would_block(&self) -> bool {
        read(&self.mailbox).rx.is_empty()
    }

    /// Enqueue a packet, blocking while the queue is full.
    ///
    /// The packet is dropped if this port is closed before space frees up, or
    /// if the network is terminated while waiting.
    pub(crate) fn append(&self, packet: Packet) {
        if self.is_closed() {
            trace!(port = %self.address, "append on closed port, packet dropped");
            return;
        }
        let (tx, closed) = {
            let mailbox = read(&self.mailbox);
            (mailbox.tx.clone(), mailbox.closed.clone())
        };

        let packet = match tx.try_send(packet) {
            Ok(()) => {
                self.notify_owner();
                return;
            }
            Err(TrySendError::Disconnected(_)) => return,
            Err(TrySendError::Full(packet)) => packet,
        };

        // Queue full, or a zero-capacity hand-off with no reader waiting:
        // make sure the owner runs so someone will drain it.
        self.notify_owner();

        let shutdown = self.network.shutdown();
        select! {
            send(tx, packet) -> res => {
                if res.is_err() {
                    // Mailbox was replaced by a reset while we waited.
                    return;
                }
            }
            recv(closed) -> _ => {
                trace!(port = %self.address, "port closed while waiting for space, packet dropped");
                return;
            }
            recv(shutdown) -> _ => {
                debug!(port = %self.address, "append interrupted by network shutdown");
                return;
            }
        }
        self.notify_owner();
    }

    fn notify_owner(&self) {
        if let Some(owner) = self.owner.upgrade() {
            owner.notify_packet();
        }
    }

    /// Pop the oldest packet, blocking while the queue is empty and the
    /// upstream output port is still open.
    ///
    /// Returns `None` once the upstream is closed and the queue is drained;
    /// the port closes itself at that point.
    pub fn receive(&self) -> Option<Packet> {
        if self.is_closed() {
            return None;
        }
        let (rx, eof, closed) = {
            let mailbox = read(&self.mailbox);
            (mailbox.rx.clone(), mailbox.eof.clone(), mailbox.closed.clone())
        };

        if self.upstream_closed.load(Ordering::SeqCst) && rx.is_empty() {
            self.close();
            return None;
        }

        let shutdown = self.network.shutdown();
        let packet = select! {
            recv(rx) -> msg => msg.ok(),
            recv(eof) -> _ => rx.try_recv().ok(),
            recv(closed) -> _ => None,
            recv(shutdown) -> _ => {
                debug!(port = %self.address, "receive interrupted by network shutdown");
                None
            }
        };

        if self.upstream_closed.load(Ordering::SeqCst) && rx.is_empty() {
            self.close();
        }

        if let Some(packet) = &packet {
            if let Some(tracer) = self.network.tracers().port {
                tracer.on_receive(&self.owner_name, &self.address, packet);
            }
        }
        packet
    }

    /// Close this port and its paired output port. Idempotent.
    ///
    /// Buffered packets are discarded and blocked readers or writers return.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(tracer) = self.network.tracers().port {
            tracer.on_close(&self.owner_name, &self.address);
        }
        {
            let mut mailbox = write(&self.mailbox);
            while mailbox.rx.try_recv().is_ok() {}
            mailbox.close_guard.take();
        }
        if let Some(upstream) = self.upstream.get().and_then(Weak::upgrade) {
            upstream.close();
        }
    }

    /// Called by the paired output port on its first close.
    pub(crate) fn out_port_closed(&self) {
        if self.is_closed() {
            return;
        }
        self.upstream_closed.store(true, Ordering::SeqCst);
        write(&self.mailbox).eof_guard.take();
        if let Some(owner) = self.owner.upgrade() {
            owner.wake();
        }
    }

    /// Back to the freshly built state: open, upstream open, empty queue.
    pub(crate) fn reset(&self) {
        *write(&self.mailbox) = Mailbox::new(self.capacity);
        self.upstream_closed.store(false, Ordering::SeqCst);
        self.closed.store(false, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for BufferedInPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferedInPort")
            .field("address", &self.address)
            .field("capacity", &self.capacity)
            .field("closed", &self.is_closed())
            .finish()
    }
}
