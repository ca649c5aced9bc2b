//! Single-slot, last-value-wins mailbox between the analysis loop and a consumer

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared slot holding at most one unread value
///
/// Publishing overwrites whatever the consumer has not read yet, so a slow
/// consumer only ever sees the newest result and nothing queues up.
pub struct Mailbox<T> {
    slot: Arc<Mutex<Option<T>>>,
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the slot contents, returning the value the consumer never saw
    pub fn publish(&self, value: T) -> Option<T> {
        self.lock().replace(value)
    }

    /// Take the newest value, leaving the slot empty
    pub fn take(&self) -> Option<T> {
        self.lock().take()
    }

    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        // A panicking publisher cannot leave the Option half-written
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
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
