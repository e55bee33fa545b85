//! Append-only event records.
//!
//! Every accepted mutation produces exactly one [`Event`]. The event's
//! `sequence` equals the match version the mutation produced, so the event
//! trail of a match is gap-free starting at 1.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{IdempotencyKey, MatchId, MatchStatus, PlayerId, RequestId, RoundRecord, Symbol};

/// What kind of transition an event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    MatchCreated,
    PlayerJoined,
    PickSubmitted,
    MatchAbandoned,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MatchCreated => write!(f, "MATCH_CREATED"),
            Self::PlayerJoined => write!(f, "PLAYER_JOINED"),
            Self::PickSubmitted => write!(f, "PICK_SUBMITTED"),
            Self::MatchAbandoned => write!(f, "MATCH_ABANDONED"),
        }
    }
}

/// Transition-specific data. Enough to replay the transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    MatchCreated {
        player: PlayerId,
    },
    PlayerJoined {
        player: PlayerId,
    },
    PickSubmitted {
        player: PlayerId,
        round: u32,
        symbol: Symbol,
        /// Present when this pick completed the round.
        resolution: Option<RoundRecord>,
    },
    MatchAbandoned {
        player: PlayerId,
    },
}

impl EventPayload {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::MatchCreated { .. } => EventKind::MatchCreated,
            Self::PlayerJoined { .. } => EventKind::PlayerJoined,
            Self::PickSubmitted { .. } => EventKind::PickSubmitted,
            Self::MatchAbandoned { .. } => EventKind::MatchAbandoned,
        }
    }

    /// The player whose request produced the event.
    #[must_use]
    pub fn actor(&self) -> &PlayerId {
        match self {
            Self::MatchCreated { player }
            | Self::PlayerJoined { player }
            | Self::PickSubmitted { player, .. }
            | Self::MatchAbandoned { player } => player,
        }
    }
}

/// One accepted state transition. Never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub match_id: MatchId,
    /// Equals the match version after this transition.
    pub sequence: u64,
    pub payload: EventPayload,
    /// Match status after this transition.
    pub status_after: MatchStatus,
    /// Key of the request that produced the event (absent for creation).
    pub idempotency_key: Option<IdempotencyKey>,
    pub request_id: RequestId,
    pub recorded_at: DateTime<Utc>,
}

impl Event {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }
}
