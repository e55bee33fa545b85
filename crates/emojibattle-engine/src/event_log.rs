//! Append-only event log.
//!
//! Events are kept in global append order with a per-match index. An append
//! is accepted only if its sequence is exactly one past the match's latest
//! sequence, which makes `append` a compare-and-swap on the match version.

use std::collections::HashMap;

use emojibattle_types::{Event, MatchId, StoreError};

/// In-memory append-only record of accepted transitions.
#[derive(Debug, Default)]
pub struct EventLog {
    /// All events in append order.
    events: Vec<Event>,
    /// Positions in `events` per match, in sequence order.
    by_match: HashMap<MatchId, Vec<usize>>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest sequence recorded for a match (0 if none).
    #[must_use]
    pub fn latest_sequence(&self, match_id: &MatchId) -> u64 {
        self.by_match
            .get(match_id)
            .and_then(|positions| positions.last())
            .map_or(0, |&pos| self.events[pos].sequence)
    }

    /// Append `event` if it directly follows the match's latest event.
    ///
    /// # Errors
    /// [`StoreError::VersionConflict`] if the log already holds a different
    /// latest sequence for the match than `event.sequence - 1`.
    pub fn append(&mut self, event: Event) -> Result<(), StoreError> {
        let expected = event.sequence.saturating_sub(1);
        let actual = self.latest_sequence(&event.match_id);
        if event.sequence == 0 || actual != expected {
            return Err(StoreError::VersionConflict {
                match_id: event.match_id,
                expected,
                actual,
            });
        }
        self.by_match
            .entry(event.match_id)
            .or_default()
            .push(self.events.len());
        self.events.push(event);
        Ok(())
    }

    /// A match's events in sequence order.
    pub fn for_match(&self, match_id: &MatchId) -> impl Iterator<Item = &Event> {
        self.by_match
            .get(match_id)
            .into_iter()
            .flatten()
            .map(|&pos| &self.events[pos])
    }

    /// Up to `limit` most recent events, newest first, optionally for one match.
    #[must_use]
    pub fn recent(&self, match_id: Option<&MatchId>, limit: usize) -> Vec<&Event> {
        match match_id {
            Some(id) => self
                .by_match
                .get(id)
                .into_iter()
                .flatten()
                .rev()
                .take(limit)
                .map(|&pos| &self.events[pos])
                .collect(),
            None => self.events.iter().rev().take(limit).collect(),
        }
    }

    /// Total number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
