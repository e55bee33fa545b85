//! The storage seam between the coordinator and the hosting service.
//!
//! The coordinator needs little from durable storage: load a match's event
//! trail, read the latest sequence, and append one event conditionally on
//! the match version (compare-and-swap). Everything else about persistence belongs to
//! the implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use emojibattle_engine::EventLog;
use emojibattle_types::{Event, MatchId, StoreError};
use parking_lot::{Mutex, RwLock};

/// Durable, append-only event storage with per-match version CAS.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Append `event` only if the stored trail for `event.match_id` ends at
    /// `event.sequence - 1`.
    ///
    /// # Errors
    /// - [`StoreError::VersionConflict`] if another writer got there first
    /// - [`StoreError::Unavailable`] if storage could not be reached
    async fn append(&self, event: &Event) -> Result<(), StoreError>;

    /// The full trail of a match in sequence order; empty if unknown.
    async fn load(&self, match_id: &MatchId) -> Result<Vec<Event>, StoreError>;

    /// Sequence of the latest stored event for a match (0 if unknown).
    async fn head(&self, match_id: &MatchId) -> Result<u64, StoreError>;
}

/// [`EventStore`] backed by an in-process [`EventLog`].
///
/// Supports fault injection (outages and slow appends) so callers can
/// exercise their failure paths.
#[derive(Default)]
pub struct InMemoryEventStore {
    log: RwLock<EventLog>,
    offline: AtomicBool,
    append_delay: Mutex<Option<Duration>>,
}

impl InMemoryEventStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: while offline every call fails with `Unavailable`.
    pub fn set_available(&self, available: bool) {
        self.offline.store(!available, Ordering::SeqCst);
    }

    /// Delay every append by `delay` before it touches the log.
    pub fn set_append_delay(&self, delay: Option<Duration>) {
        *self.append_delay.lock() = delay;
    }

    /// Up to `limit` most recent events, newest first, optionally for one match.
    #[must_use]
    pub fn recent(&self, match_id: Option<&MatchId>, limit: usize) -> Vec<Event> {
        self.log
            .read()
            .recent(match_id, limit)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Number of events stored for a match.
    #[must_use]
    pub fn event_count(&self, match_id: &MatchId) -> usize {
        self.log.read().for_match(match_id).count()
    }

    /// Total number of events stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.log.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log.read().is_empty()
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, event: &Event) -> Result<(), StoreError> {
        let delay = *self.append_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.ensure_online()?;
        self.log.write().append(event.clone())
    }

    async fn load(&self, match_id: &MatchId) -> Result<Vec<Event>, StoreError> {
        self.ensure_online()?;
        Ok(self.log.read().for_match(match_id).cloned().collect())
    }

    async fn head(&self, match_id: &MatchId) -> Result<u64, StoreError> {
        self.ensure_online()?;
        Ok(self.log.read().latest_sequence(match_id))
    }
}
