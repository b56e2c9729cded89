//! Listener registration for media signals.
//!
//! `Listeners` maps a handle id to the channel its subscriber listens on.
//! Emitting for an id without a live registration drops the signal, which
//! is how a superseded handle is silenced once its `Subscription` is gone.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, Weak};

use super::types::{HandleId, MediaEvent, MediaSignal};

struct Entry {
    token: u64,
    tx: Sender<MediaSignal>,
}

#[derive(Default)]
struct Table {
    entries: HashMap<HandleId, Entry>,
}

/// Shared registry of signal listeners, cheap to clone.
#[derive(Clone, Default)]
pub struct Listeners {
    table: Arc<Mutex<Table>>,
    next_token: Arc<AtomicU64>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `tx` for signals from `id`, replacing any earlier listener.
    pub fn register(&self, id: HandleId, tx: Sender<MediaSignal>) -> Subscription {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut table) = self.table.lock() {
            table.entries.insert(id, Entry { token, tx });
        }
        Subscription {
            id,
            token,
            table: Arc::downgrade(&self.table),
        }
    }

    /// Deliver `event` to the listener registered for `id`.
    ///
    /// Returns false when nobody is listening. A listener whose receiver
    /// is gone is removed.
    pub fn emit(&self, id: HandleId, event: MediaEvent) -> bool {
        let Ok(mut table) = self.table.lock() else {
            return false;
        };
        let Some(entry) = table.entries.get(&id) else {
            return false;
        };
        if entry.tx.send(MediaSignal { source: id, event }).is_ok() {
            true
        } else {
            table.entries.remove(&id);
            false
        }
    }

    #[cfg(test)]
    pub fn is_registered(&self, id: HandleId) -> bool {
        self.table
            .lock()
            .map(|t| t.entries.contains_key(&id))
            .unwrap_or(false)
    }
}

/// Scoped registration returned by `MediaHandle::subscribe`.
///
/// Dropping it detaches the listener, unless a newer registration for the
/// same handle has replaced it in the meantime.
pub struct Subscription {
    id: HandleId,
    token: u64,
    table: Weak<Mutex<Table>>,
}

impl Subscription {
    #[cfg(test)]
    pub fn id(&self) -> HandleId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(table) = self.table.upgrade() else {
            return;
        };
        if let Ok(mut table) = table.lock() {
            if table.entries.get(&self.id).map(|e| e.token) == Some(self.token) {
                table.entries.remove(&self.id);
            }
        }
    }
}
