//! Cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::SearchError;

/// A cancellation flag shared between an orchestrator and the steps of its current run.
///
/// Steps call [`CancelFlag::check`] before every suspension point; nothing is interrupted
/// mid-fetch.
#[derive(Debug, Default)]
pub struct CancelFlag {
    /// Set when cancellation has been requested.
    canceled: AtomicBool,
}

impl CancelFlag {
    /// Creates a flag that is not canceled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    /// Clears a previous cancellation request.
    pub fn reset(&self) {
        self.canceled.store(false, Ordering::SeqCst);
    }

    /// Returns true if cancellation has been requested.
    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }

    /// Fails with [`SearchError::Canceled`] if cancellation has been requested.
    pub fn check(&self) -> Result<(), SearchError> {
        if self.is_canceled() {
            Err(SearchError::Canceled)
        } else {
            Ok(())
        }
    }
}
