//! # emojibattle-engine
//!
//! **Pure match engine for Emoji Battle.**
//!
//! The engine owns the game semantics and nothing else:
//!
//! - **Zero I/O**: no storage, no locking, no clocks beyond event timestamps
//! - **Deterministic resolution**: same picks + same rule set -> same outcome
//! - **All-or-nothing transitions**: a rejected command leaves the match untouched
//! - **Replayable**: a match can be rebuilt from its event trail

pub mod event_log;
pub mod rules;
pub mod state_machine;

pub use event_log::EventLog;
pub use rules::{RuleSet, RuleSetConfig};
pub use state_machine::{Command, Match, Transition};
