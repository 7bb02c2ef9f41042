//! Overlay lifecycle state machine and animation completion handling.
//!
//! Every overlay moves through `Entering → Visible → Leaving → Destroyed`.
//! [`Lifecycle`] holds the pure transition rules; the manager drives it from
//! animation [`Completion`]s, each raced against a grace timer so that a
//! missing signal can never leave an overlay stuck.

use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::oneshot;

/// Lifecycle state of an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayState {
    /// Mounted, enter animation running.
    Entering,
    /// Steady state.
    Visible,
    /// Exit animation running.
    Leaving,
    /// Unmounted and forgotten by the manager. Terminal.
    Destroyed,
}

impl fmt::Display for OverlayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayState::Entering => write!(f, "entering"),
            OverlayState::Visible => write!(f, "visible"),
            OverlayState::Leaving => write!(f, "leaving"),
            OverlayState::Destroyed => write!(f, "destroyed"),
        }
    }
}

/// Shared, read-mostly view of an overlay's state.
///
/// Handles keep a clone so they can still report `Destroyed` after the
/// manager has dropped the instance.
#[derive(Debug, Clone)]
pub(crate) struct StateCell(Arc<RwLock<OverlayState>>);

impl StateCell {
    fn new(state: OverlayState) -> Self {
        Self(Arc::new(RwLock::new(state)))
    }

    pub(crate) fn get(&self) -> OverlayState {
        *self.0.read().unwrap_or_else(|e| e.into_inner())
    }

    fn set(&self, state: OverlayState) {
        *self.0.write().unwrap_or_else(|e| e.into_inner()) = state;
    }
}

/// What a close request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CloseRequest {
    /// Visible → Leaving; the exit animation must be started.
    Begin,
    /// Still entering; the close will be replayed once the enter completes.
    Buffered,
    /// Already leaving or destroyed.
    AlreadyClosing,
}

/// What an enter completion did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EnterOutcome {
    /// Entering → Visible.
    Visible,
    /// Entering → Leaving because a close was buffered.
    ReplayClose,
    /// The overlay was not entering; nothing changed.
    Stale,
}

/// Pure lifecycle transitions for one overlay.
#[derive(Debug)]
pub(crate) struct Lifecycle {
    cell: StateCell,
    close_pending: bool,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            cell: StateCell::new(OverlayState::Entering),
            close_pending: false,
        }
    }

    pub(crate) fn state(&self) -> OverlayState {
        self.cell.get()
    }

    pub(crate) fn cell(&self) -> StateCell {
        self.cell.clone()
    }

    pub(crate) fn close_pending(&self) -> bool {
        self.close_pending
    }

    /// Request a close. Closes during Entering are sticky.
    pub(crate) fn request_close(&mut self) -> CloseRequest {
        match self.state() {
            OverlayState::Entering => {
                self.close_pending = true;
                CloseRequest::Buffered
            }
            OverlayState::Visible => {
                self.cell.set(OverlayState::Leaving);
                CloseRequest::Begin
            }
            OverlayState::Leaving | OverlayState::Destroyed => CloseRequest::AlreadyClosing,
        }
    }

    /// The enter animation finished (or was forced).
    pub(crate) fn enter_complete(&mut self) -> EnterOutcome {
        if self.state() != OverlayState::Entering {
            return EnterOutcome::Stale;
        }

        if self.close_pending {
            self.close_pending = false;
            self.cell.set(OverlayState::Leaving);
            EnterOutcome::ReplayClose
        } else {
            self.cell.set(OverlayState::Visible);
            EnterOutcome::Visible
        }
    }

    /// The exit animation finished (or was forced). Returns false if not leaving.
    pub(crate) fn leave_complete(&mut self) -> bool {
        if self.state() != OverlayState::Leaving {
            return false;
        }
        self.cell.set(OverlayState::Destroyed);
        true
    }
}

/// Which animation a completion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Enter,
    Exit,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Enter => write!(f, "enter"),
            Phase::Exit => write!(f, "exit"),
        }
    }
}

/// Animation-complete signal handed back by an animator.
#[derive(Debug)]
pub enum Completion {
    /// Nothing to wait for.
    Immediate,
    /// Resolves when the paired [`CompletionSignal`] fires.
    Pending(oneshot::Receiver<()>),
}

impl Completion {
    pub fn immediate() -> Self {
        Completion::Immediate
    }

    /// Create a pending completion and the signal that resolves it.
    pub fn channel() -> (CompletionSignal, Completion) {
        let (tx, rx) = oneshot::channel();
        (CompletionSignal { tx }, Completion::Pending(rx))
    }

    pub fn is_immediate(&self) -> bool {
        matches!(self, Completion::Immediate)
    }
}

/// Sending half of a [`Completion`].
///
/// Dropping it without firing counts as completion (the wait ends early).
#[derive(Debug)]
pub struct CompletionSignal {
    tx: oneshot::Sender<()>,
}

impl CompletionSignal {
    /// Report the animation as finished.
    pub fn fire(self) {
        let _ = self.tx.send(());
    }
}

/// How a wait for a completion ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The animator signalled completion.
    Fired,
    /// The signal was dropped without firing.
    Dropped,
    /// The grace period ran out first.
    TimedOut,
}

/// Wait for a completion, racing it against `grace`.
pub async fn wait_for(completion: Completion, grace: Duration) -> CompletionOutcome {
    match completion {
        Completion::Immediate => CompletionOutcome::Fired,
        Completion::Pending(rx) => match tokio::time::timeout(grace, rx).await {
            Ok(Ok(())) => CompletionOutcome::Fired,
            Ok(Err(_)) => CompletionOutcome::Dropped,
            Err(_) => CompletionOutcome::TimedOut,
        },
    }
}
