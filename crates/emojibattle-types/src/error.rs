//! Error types for the Emoji Battle match engine.
//!
//! All errors use the `EB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by taxonomy kind:
//! - 1xx: Invalid input
//! - 2xx: Forbidden
//! - 3xx: Conflict
//! - 4xx: Invalid state
//! - 5xx: Not found
//! - 8xx: Configuration (startup only)
//! - 9xx: Unavailable (internal faults, store failures)
//!
//! Errors are `Clone + Serialize` because a domain error is itself an
//! idempotency-ledgered outcome and must replay verbatim.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{MatchId, MatchStatus};

/// Central error enum for all engine operations.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum MatchError {
    /// Malformed or out-of-domain request data (empty ids, unknown symbol).
    #[error("EB_ERR_100: Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The caller may not act on this match or slot.
    #[error("EB_ERR_200: Forbidden: {reason}")]
    Forbidden { reason: String },

    /// The request clashes with already-recorded state.
    #[error("EB_ERR_300: Conflict: {reason}")]
    Conflict { reason: String },

    /// The operation is not valid in the match's current lifecycle state.
    #[error("EB_ERR_400: Invalid state {status}: {reason}")]
    InvalidState { status: MatchStatus, reason: String },

    /// Unknown match.
    #[error("EB_ERR_500: Match not found: {0}")]
    NotFound(MatchId),

    /// Invalid rule set or engine configuration. Raised at startup only.
    #[error("EB_ERR_800: Configuration error: {0}")]
    Configuration(String),

    /// Durability layer failed or timed out. The only retryable kind.
    #[error("EB_ERR_900: Unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, MatchError>;

/// Coarse error taxonomy, as surfaced to the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidInput,
    Forbidden,
    Conflict,
    InvalidState,
    NotFound,
    Configuration,
    Unavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "INVALID_INPUT"),
            Self::Forbidden => write!(f, "FORBIDDEN"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::InvalidState => write!(f, "INVALID_STATE"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
        }
    }
}

impl MatchError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    pub fn invalid_state(status: MatchStatus, reason: impl Into<String>) -> Self {
        Self::InvalidState {
            status,
            reason: reason.into(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Unavailable { .. } => ErrorKind::Unavailable,
        }
    }

    /// Whether the collaborator may retry the identical request transparently.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Unavailable
    }

    /// Whether this outcome belongs in the idempotency ledger.
    ///
    /// Deterministic domain rejections are ledgered. Faults and unknown
    /// matches are not: a retry must re-evaluate them.
    #[must_use]
    pub fn is_ledgered(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidInput
                | ErrorKind::Forbidden
                | ErrorKind::Conflict
                | ErrorKind::InvalidState
        )
    }
}

/// Failure reported by the event store behind the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Another writer appended first; the caller's view of the match is stale.
    #[error("EB_ERR_901: Version conflict for {match_id}: based on {expected}, store is at {actual}")]
    VersionConflict {
        match_id: MatchId,
        expected: u64,
        actual: u64,
    },

    /// The durability layer could not be reached.
    #[error("EB_ERR_902: Store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for MatchError {
    fn from(err: StoreError) -> Self {
        Self::Unavailable {
            reason: err.to_string(),
        }
    }
}

// Conversion from std::io::Error (rule file loading).
impl From<std::io::Error> for MatchError {
    fn from(err: std::io::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl From<serde_json::Error> for MatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}
