//! # emojibattle-coordinator
//!
//! **Concurrency boundary** of the Emoji Battle engine: per-match
//! serialization, idempotent replay, and durable event appends.
//!
//! ## Architecture
//!
//! The [`MatchCoordinator`] receives join / pick / abandon requests and:
//! 1. Replays the stored outcome if the idempotency key was already evaluated
//! 2. Serializes on the match's unit (one mutation per match at a time)
//! 3. Applies the command to a working copy through the pure engine
//! 4. Appends the resulting event to the [`EventStore`] (version CAS)
//! 5. Swaps in the new state, publishes the snapshot, and ledgers the outcome
//!
//! Reads go straight to the last published snapshot and never block on
//! writers. Matches not resident in memory are rebuilt from the store.

pub mod coordinator;
pub mod error_journal;
pub mod idempotency;
pub mod store;

pub use coordinator::{AbandonRequest, JoinRequest, MatchCoordinator, PickRequest};
pub use error_journal::{ErrorJournal, ErrorRecord};
pub use idempotency::{IdempotencyLedger, LedgerEntry, LedgerKey};
pub use store::{EventStore, InMemoryEventStore};
