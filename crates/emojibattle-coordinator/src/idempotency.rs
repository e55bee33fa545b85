//! Idempotency ledger: replays the recorded result of a retried request.
//!
//! Each join / pick / abandon carries a caller-chosen key. The first time a
//! `(match, player, operation, key)` is evaluated its outcome is stored here,
//! success or domain error alike. Any later request with the same scope gets
//! that stored outcome back verbatim, no matter what the match has done since.
//!
//! The ledger is bounded: when `max_size` entries are held, the oldest entry
//! is evicted to make room. Within one process, replay is guaranteed for the
//! most recent `max_size` ledgered operations.
//!
//! The ledger itself is not persisted. After a restart it is rebuilt from the
//! idempotency keys on stored events, so accepted transitions still replay.
//! Rejections leave no event behind: a retry of a rejected request after a
//! restart is evaluated afresh.

use std::collections::{HashMap, VecDeque};

use emojibattle_types::{
    IdempotencyKey, MatchError, MatchId, OperationKind, OperationReceipt, PlayerId,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Scope of one idempotency key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerKey {
    pub match_id: MatchId,
    pub player: PlayerId,
    pub operation: OperationKind,
    pub key: IdempotencyKey,
}

impl LedgerKey {
    #[must_use]
    pub fn new(
        match_id: MatchId,
        player: PlayerId,
        operation: OperationKind,
        key: IdempotencyKey,
    ) -> Self {
        Self {
            match_id,
            player,
            operation,
            key,
        }
    }
}

/// The outcome stored for a key.
pub type LedgerEntry = Result<OperationReceipt, MatchError>;

struct LedgerInner {
    entries: HashMap<LedgerKey, LedgerEntry>,
    /// Insertion order for eviction (front = oldest).
    order: VecDeque<LedgerKey>,
}

/// Shared, bounded record of previously evaluated mutating requests.
///
/// Entries for different scopes never interact; the internal lock only
/// guards the map itself and is never held across an await.
pub struct IdempotencyLedger {
    inner: Mutex<LedgerInner>,
    /// Maximum number of entries before eviction kicks in.
    max_size: usize,
}

impl IdempotencyLedger {
    /// Create a new ledger with the given maximum size.
    ///
    /// # Panics
    /// Panics if `max_size` is zero.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        assert!(max_size > 0, "IdempotencyLedger max_size must be > 0");
        Self {
            inner: Mutex::new(LedgerInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            max_size,
        }
    }

    /// The stored outcome for `key`, if any.
    #[must_use]
    pub fn lookup(&self, key: &LedgerKey) -> Option<LedgerEntry> {
        self.inner.lock().entries.get(key).cloned()
    }

    /// Store the outcome for `key`. The first outcome recorded wins: returns
    /// `false` and leaves the ledger unchanged if `key` is already present.
    pub fn record(&self, key: LedgerKey, entry: LedgerEntry) -> bool {
        let mut inner = self.inner.lock();
        if inner.entries.contains_key(&key) {
            return false;
        }

        // Evict oldest if at capacity.
        if inner.entries.len() >= self.max_size {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
            }
        }

        inner.order.push_back(key.clone());
        inner.entries.insert(key, entry);
        true
    }

    #[must_use]
    pub fn contains(&self, key: &LedgerKey) -> bool {
        self.inner.lock().entries.contains_key(key)
    }

    /// Number of keys currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }
}
