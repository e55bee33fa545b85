//! Bounded journal of rejected requests, newest first, for debug tooling.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use emojibattle_types::{ErrorKind, MatchError, MatchId, OperationKind, RequestId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// One rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub request_id: RequestId,
    pub match_id: Option<MatchId>,
    /// `None` for reads.
    pub operation: Option<OperationKind>,
    pub kind: ErrorKind,
    pub message: String,
    pub recorded_at: DateTime<Utc>,
}

/// Fixed-capacity ring of [`ErrorRecord`]s. Oldest records fall off first.
pub struct ErrorJournal {
    records: Mutex<VecDeque<ErrorRecord>>,
    capacity: usize,
}

impl ErrorJournal {
    /// # Panics
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ErrorJournal capacity must be > 0");
        Self {
            records: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn record(
        &self,
        request_id: &RequestId,
        match_id: Option<MatchId>,
        operation: Option<OperationKind>,
        error: &MatchError,
    ) {
        let mut records = self.records.lock();
        if records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(ErrorRecord {
            request_id: request_id.clone(),
            match_id,
            operation,
            kind: error.kind(),
            message: error.to_string(),
            recorded_at: Utc::now(),
        });
    }

    /// Up to `limit` most recent records, newest first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<ErrorRecord> {
        self.records.lock().iter().rev().take(limit).cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_first_and_bounded() {
        let journal = ErrorJournal::new(2);
        for i in 0..3 {
            journal.record(
                &RequestId::new(format!("r{i}")),
                None,
                Some(OperationKind::Pick),
                &MatchError::invalid_input(format!("bad {i}")),
            );
        }
        assert_eq!(journal.len(), 2);

        let recent = journal.recent(10);
        assert_eq!(recent[0].request_id, RequestId::new("r2"));
        assert_eq!(recent[1].request_id, RequestId::new("r1"));
        assert_eq!(recent[0].kind, ErrorKind::InvalidInput);
        assert!(recent[0].message.starts_with("EB_ERR_100"));
    }

    #[test]
    fn limit_applies() {
        let journal = ErrorJournal::new(10);
        assert!(journal.is_empty());
        for _ in 0..5 {
            journal.record(&RequestId::new("r"), None, None, &MatchError::unavailable("down"));
        }
        assert_eq!(journal.recent(3).len(), 3);
    }
}
