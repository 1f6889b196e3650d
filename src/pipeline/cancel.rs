//! Per-root cancellation signal.
//!
//! The signal is a zero-capacity channel that never carries a message: dropping the only sender
//! disconnects it, which every clone of the [`CancelToken`] observes at once, including threads
//! blocked in a `select!` on it. That lets the walker and the digesters wait on "downstream is
//! ready" and "run was cancelled" at the same time.

use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded, select};

/// Owner side. Raising the signal is idempotent; dropping the handle raises it too, so the
/// signal is always released when a root finishes, whatever the exit path.
pub struct CancelHandle {
    tx: Option<Sender<()>>,
}

/// Observer side, cloned into every stage that has a blocking send.
#[derive(Clone)]
pub struct CancelToken {
    rx: Receiver<()>,
}

/// Outcome of a cancellable handoff to a downstream channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handoff {
    /// The item was queued or taken by a receiver.
    Delivered,
    /// The signal was raised before the item could be handed off; the item was dropped.
    Cancelled,
    /// Every receiver is gone; the item was dropped.
    Disconnected,
}

/// Create a fresh signal for one root.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = bounded(0);
    (CancelHandle { tx: Some(tx) }, CancelToken { rx })
}

impl CancelHandle {
    /// Raise the signal.
    pub fn cancel(&mut self) {
        self.tx.take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.tx.is_none()
    }
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        matches!(self.rx.try_recv(), Err(TryRecvError::Disconnected))
    }
}

/// Blocking send that gives up as soon as `cancel` is raised.
///
/// Checks the signal first so an already-cancelled stage never hands off more work, then blocks
/// until either a receiver takes the item or the signal is raised.
pub fn send_or_cancel<T>(tx: &Sender<T>, item: T, cancel: &CancelToken) -> Handoff {
    if cancel.is_cancelled() {
        return Handoff::Cancelled;
    }
    select! {
        send(tx, item) -> res => match res {
            Ok(()) => Handoff::Delivered,
            Err(_) => Handoff::Disconnected,
        },
        recv(cancel.rx) -> _ => Handoff::Cancelled,
    }
}
