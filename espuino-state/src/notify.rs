//! Update notifications for entity observers
//!
//! Entities hold a [`ChangeNotifier`] and emit one [`EntityUpdate`] whenever a
//! handled message changes their visible state. Observers drain the paired
//! [`UpdateReceiver`] and read fresh snapshots from the entities.
//!
//! ```rust
//! use espuino_state::notify::channel;
//!
//! let (notifier, updates) = channel();
//! notifier.notify("kids_media_player");
//!
//! let update = updates.try_recv().unwrap();
//! assert_eq!(update.unique_id, "kids_media_player");
//! assert!(updates.try_recv().is_none());
//! ```

use std::sync::mpsc;
use std::time::{Duration, Instant};

/// Emitted when an entity's observable state changed
///
/// Carries only the entity id; read the new values from the entity itself.
#[derive(Debug, Clone)]
pub struct EntityUpdate {
    /// Unique id of the entity that changed
    pub unique_id: String,

    /// When the change was applied
    pub timestamp: Instant,
}

impl EntityUpdate {
    pub fn new(unique_id: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            timestamp: Instant::now(),
        }
    }
}

impl PartialEq for EntityUpdate {
    fn eq(&self, other: &Self) -> bool {
        // Timestamp not included in equality
        self.unique_id == other.unique_id
    }
}

/// Create a connected notifier/receiver pair
pub fn channel() -> (ChangeNotifier, UpdateReceiver) {
    let (tx, rx) = mpsc::channel();
    (ChangeNotifier { tx }, UpdateReceiver { rx })
}

/// Sending half handed to each entity at construction
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: mpsc::Sender<EntityUpdate>,
}

impl ChangeNotifier {
    /// Emit an update for `unique_id`
    ///
    /// A dropped receiver is not an error: nobody is observing.
    pub fn notify(&self, unique_id: &str) {
        if self.tx.send(EntityUpdate::new(unique_id)).is_err() {
            tracing::trace!("No observer for update of {}", unique_id);
        }
    }
}

/// Receiving half held by the observer
#[derive(Debug)]
pub struct UpdateReceiver {
    rx: mpsc::Receiver<EntityUpdate>,
}

impl UpdateReceiver {
    /// Block until the next update
    ///
    /// Returns `None` once every notifier is dropped.
    pub fn recv(&self) -> Option<EntityUpdate> {
        self.rx.recv().ok()
    }

    /// Block until the next update or timeout expires
    pub fn recv_timeout(&self, timeout: Duration) -> Option<EntityUpdate> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Take an update without blocking
    pub fn try_recv(&self) -> Option<EntityUpdate> {
        self.rx.try_recv().ok()
    }

    /// Non-blocking iterator over updates currently queued
    pub fn try_iter(&self) -> TryIter<'_> {
        TryIter { inner: self }
    }
}

/// Non-blocking iterator over currently available updates
pub struct TryIter<'a> {
    inner: &'a UpdateReceiver,
}

impl<'a> Iterator for TryIter<'a> {
    type Item = EntityUpdate;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.try_recv()
    }
}
