//! Inter-task plumbing.
//!
//! Subsystems run on separate workers and never share mutable fields.
//! Intents cross task boundaries through these primitives and are observed
//! by the owning subsystem at its next tick.
//!
//! - [`Mailbox`] - one-slot mailbox; a newer post replaces an unread one.
//! - [`Latch`] - one-shot flag consumed by the reader.
//! - [`WinchLink`] - the Scaling ↔ Drives climb handshake.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

/// Cloneable one-slot mailbox.
///
/// All clones share the same slot.
#[derive(Debug)]
pub struct Mailbox<T> {
    slot: Arc<Mutex<Option<T>>>,
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Deposit `value`, replacing any unread value. Returns the replaced value.
    pub fn post(&self, value: T) -> Option<T> {
        self.slot.lock().replace(value)
    }

    /// Consume the pending value, if any.
    pub fn take(&self) -> Option<T> {
        self.slot.lock().take()
    }

    /// True if a value is waiting.
    pub fn is_full(&self) -> bool {
        self.slot.lock().is_some()
    }
}

impl<T> Clone for Mailbox<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable one-shot flag.
#[derive(Debug, Clone, Default)]
pub struct Latch {
    flag: Arc<AtomicBool>,
}

impl Latch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the latch. Arming an armed latch is a no-op.
    pub fn set(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Consume the latch. Returns whether it was armed.
    pub fn take(&self) -> bool {
        self.flag.swap(false, Ordering::AcqRel)
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Requests sent from Scaling to the Drives winch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WinchRequest {
    /// Arm the winch for `distance` inches and wait for the hooks.
    BeginWinch { distance: f64 },
    /// Abort autonomous motion and any climb in progress.
    EStop,
}

/// Scaling ↔ Drives climb handshake.
///
/// Scaling posts [`WinchRequest`]s and publishes whether both hooks are
/// engaged; Drives answers with a single completion token per climb.
///
/// An e-stop travels on its own latch so no later request can overwrite
/// it. It is always delivered before a pending `BeginWinch`, and it
/// discards a `BeginWinch` posted before it.
#[derive(Debug, Clone, Default)]
pub struct WinchLink {
    requests: Mailbox<WinchRequest>,
    estop: Latch,
    hooked: Arc<AtomicBool>,
    done: Mailbox<()>,
}

impl WinchLink {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Scaling side ──

    pub fn request(&self, request: WinchRequest) {
        let dropped = match request {
            WinchRequest::EStop => {
                self.estop.set();
                self.requests.take()
            }
            WinchRequest::BeginWinch { .. } => self.requests.post(request),
        };
        if let Some(dropped) = dropped {
            tracing::debug!("winch request {dropped:?} superseded by {request:?}");
        }
    }

    pub fn publish_hooked(&self, hooked: bool) {
        self.hooked.store(hooked, Ordering::Release);
    }

    /// Consume the completion token. True exactly once per finished climb.
    pub fn take_done(&self) -> bool {
        self.done.take().is_some()
    }

    // ── Drives side ──

    /// Next pending request, e-stop first. Drain until `None` each tick.
    pub fn next_request(&self) -> Option<WinchRequest> {
        if self.estop.take() {
            return Some(WinchRequest::EStop);
        }
        self.requests.take()
    }

    pub fn hooked(&self) -> bool {
        self.hooked.load(Ordering::Acquire)
    }

    pub fn complete(&self) {
        self.done.post(());
    }
}
