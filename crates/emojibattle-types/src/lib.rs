//! # emojibattle-types
//!
//! Shared types, errors, and configuration for the **Emoji Battle** match
//! coordination engine.
//!
//! This crate is the leaf dependency of the workspace: every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`MatchId`], [`PlayerId`], [`IdempotencyKey`], [`RequestId`]
//! - **Symbols**: [`Symbol`], [`Outcome`]
//! - **Match model**: [`MatchStatus`], [`RoundRecord`], [`MatchSnapshot`], [`OperationReceipt`]
//! - **Event model**: [`Event`], [`EventKind`], [`EventPayload`]
//! - **Configuration**: [`EngineConfig`]
//! - **Errors**: [`MatchError`] with `EB_ERR_` prefix codes
//! - **Constants**: engine-wide limits and defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod match_state;
pub mod symbol;

// Re-export all primary types at crate root for ergonomic imports:
//   use emojibattle_types::{MatchId, MatchSnapshot, MatchError, ...};

pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use match_state::*;
pub use symbol::*;

// Constants are accessed via `emojibattle_types::constants::FOO`
// (not re-exported to avoid name collisions).
