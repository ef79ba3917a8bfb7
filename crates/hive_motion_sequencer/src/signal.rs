// SPDX-License-Identifier: MIT OR Apache-2.0
//! One-shot completion notification.
//!
//! A [`CompletionSignal`] belongs to exactly one playback. It fires once when
//! the playback completes and is suppressed for good if the playback is
//! cancelled first. Listeners may ask for a grace period; the director then
//! runs them on the first tick at or after `completed_at + grace`.

use crate::director::SequenceHandle;
use crate::error::{MotionError, Result};

/// Callback run when a sequence completes
pub type CompletionCallback = Box<dyn FnOnce(SequenceHandle)>;

/// Lifecycle of a signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalState {
    /// Waiting for completion
    Armed,
    /// Fired at the given completion time
    Fired(f32),
    /// Cancelled before completion, never fires
    Suppressed,
}

/// A callback scheduled to run at or after `due`
pub struct DueCallback {
    /// Earliest time the callback may run
    pub due: f32,
    /// Sequence that completed
    pub handle: SequenceHandle,
    /// The callback
    pub callback: CompletionCallback,
}

impl std::fmt::Debug for DueCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DueCallback")
            .field("due", &self.due)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

struct Listener {
    grace: f32,
    callback: CompletionCallback,
}

/// Single-fire completion signal for one playback
pub struct CompletionSignal {
    handle: SequenceHandle,
    state: SignalState,
    listeners: Vec<Listener>,
}

impl CompletionSignal {
    /// Create an armed signal
    pub fn new(handle: SequenceHandle) -> Self {
        Self {
            handle,
            state: SignalState::Armed,
            listeners: Vec::new(),
        }
    }

    /// Register a listener.
    ///
    /// Armed: kept until the signal fires. Fired: returned so it can be
    /// scheduled right away. Suppressed: dropped.
    pub fn listen(&mut self, grace: f32, callback: CompletionCallback) -> Option<DueCallback> {
        let grace = grace.max(0.0);
        match self.state {
            SignalState::Armed => {
                self.listeners.push(Listener { grace, callback });
                None
            }
            SignalState::Fired(completed_at) => Some(DueCallback {
                due: completed_at + grace,
                handle: self.handle,
                callback,
            }),
            SignalState::Suppressed => {
                tracing::debug!("Dropping completion listener for cancelled {:?}", self.handle);
                None
            }
        }
    }

    /// Fire the signal, handing back every listener with its due time
    pub fn fire(&mut self, completed_at: f32) -> Result<Vec<DueCallback>> {
        match self.state {
            SignalState::Armed => {
                self.state = SignalState::Fired(completed_at);
                let handle = self.handle;
                Ok(self
                    .listeners
                    .drain(..)
                    .map(|listener| DueCallback {
                        due: completed_at + listener.grace,
                        handle,
                        callback: listener.callback,
                    })
                    .collect())
            }
            SignalState::Fired(_) => Err(MotionError::DoubleCompletion(self.handle)),
            SignalState::Suppressed => {
                tracing::error!("Completion fired for cancelled {:?}", self.handle);
                Ok(Vec::new())
            }
        }
    }

    /// Suppress permanently; pending listeners are dropped
    pub fn suppress(&mut self) {
        if self.state == SignalState::Armed {
            self.state = SignalState::Suppressed;
            self.listeners.clear();
        }
    }

    /// Current state
    pub fn state(&self) -> SignalState {
        self.state
    }

    /// Number of listeners waiting
    pub fn pending_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for CompletionSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionSignal")
            .field("handle", &self.handle)
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counter() -> (Rc<Cell<u32>>, CompletionCallback) {
        let count = Rc::new(Cell::new(0));
        let inner = count.clone();
        (count, Box::new(move |_| inner.set(inner.get() + 1)))
    }

    #[test]
    fn test_fires_once() {
        let handle = SequenceHandle::new();
        let mut signal = CompletionSignal::new(handle);
        let (count, callback) = counter();
        assert!(signal.listen(0.5, callback).is_none());

        let due = signal.fire(1.8).unwrap();
        assert_eq!(due.len(), 1);
        assert!((due[0].due - 2.3).abs() < 1e-6);
        for item in due {
            (item.callback)(item.handle);
        }
        assert_eq!(count.get(), 1);

        assert_eq!(signal.fire(1.9).unwrap_err(), MotionError::DoubleCompletion(handle));
    }

    #[test]
    fn test_suppressed_never_fires() {
        let mut signal = CompletionSignal::new(SequenceHandle::new());
        let (count, callback) = counter();
        signal.listen(0.0, callback);
        signal.suppress();
        assert_eq!(signal.pending_count(), 0);
        assert!(signal.fire(2.0).unwrap().is_empty());
        assert_eq!(signal.state(), SignalState::Suppressed);
        assert_eq!(count.get(), 0);

        let (_late, callback) = counter();
        assert!(signal.listen(0.0, callback).is_none());
    }

    #[test]
    fn test_late_listener_is_due_immediately() {
        let mut signal = CompletionSignal::new(SequenceHandle::new());
        signal.fire(1.4).unwrap();
        let (_count, callback) = counter();
        let due = signal.listen(0.0, callback).expect("already fired");
        assert_eq!(due.due, 1.4);
    }
}
