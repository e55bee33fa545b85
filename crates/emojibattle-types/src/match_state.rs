//! Match lifecycle types and the read-only views handed to callers.
//!
//! ## State Machine
//!
//! ```text
//!   ┌────────────────────────┐  join   ┌─────────────┐
//!   │ AWAITING_SECOND_PLAYER ├────────▶│ IN_PROGRESS │◀──────────┐
//!   └───────────┬────────────┘         └──────┬──────┘           │ next round
//!               │                             │ both picks in    │
//!               │ abandon                     ▼                  │
//!               │                     ┌────────────────┐         │
//!               │                     │ ROUND_RESOLVED ├─────────┘
//!               │                     └───────┬────────┘
//!               ▼                             │ threshold reached
//!         ┌───────────┐               ┌───────▼──┐
//!         │ ABANDONED │               │ COMPLETE │
//!         └───────────┘               └──────────┘
//! ```
//!
//! `ROUND_RESOLVED` is transient: it only exists inside a single pick
//! application and is never published.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{MatchId, Outcome, PlayerId, Symbol};

/// Lifecycle state of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStatus {
    /// One player seated, waiting for an opponent.
    AwaitingSecondPlayer,
    /// Both players seated, accepting picks for the current round.
    InProgress,
    /// Both picks in for the current round; advances before the call returns.
    RoundResolved,
    /// Terminal: a winner or an overall draw has been decided.
    Complete,
    /// Terminal: a seated player cancelled the match.
    Abandoned,
}

impl MatchStatus {
    /// Terminal states accept no further mutations.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Abandoned)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingSecondPlayer => write!(f, "AWAITING_SECOND_PLAYER"),
            Self::InProgress => write!(f, "IN_PROGRESS"),
            Self::RoundResolved => write!(f, "ROUND_RESOLVED"),
            Self::Complete => write!(f, "COMPLETE"),
            Self::Abandoned => write!(f, "ABANDONED"),
        }
    }
}

/// The mutating operations, used to scope idempotency keys and label logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OperationKind {
    Create,
    Join,
    Pick,
    Abandon,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Join => write!(f, "join"),
            Self::Pick => write!(f, "pick"),
            Self::Abandon => write!(f, "abandon"),
        }
    }
}

/// One player's accepted pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPick {
    pub player: PlayerId,
    pub symbol: Symbol,
}

/// A resolved round.
///
/// `first` belongs to slot 0 and `second` to slot 1; `outcome` is expressed
/// in that order (`WinA` means slot 0 took the round).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: u32,
    pub first: PlayerPick,
    pub second: PlayerPick,
    pub outcome: Outcome,
    /// The round winner, `None` on a draw.
    pub winner: Option<PlayerId>,
}

/// Internally consistent, read-only view of a match.
///
/// Pending picks for the current round are reported by player only; the
/// symbols stay hidden until the round resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub match_id: MatchId,
    pub status: MatchStatus,
    /// Seated players in slot order.
    pub players: Vec<PlayerId>,
    pub current_round: u32,
    /// Players that already picked in the current round.
    pub picked_this_round: Vec<PlayerId>,
    /// Resolved rounds, oldest first.
    pub rounds: Vec<RoundRecord>,
    pub winner: Option<PlayerId>,
    pub version: u64,
}

impl MatchSnapshot {
    /// Round wins accumulated by `player`.
    #[must_use]
    pub fn wins_for(&self, player: &PlayerId) -> usize {
        self.rounds
            .iter()
            .filter(|r| r.winner.as_ref() == Some(player))
            .count()
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Result of an accepted join, pick, or abandon.
///
/// This is the value stored in the idempotency ledger and replayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationReceipt {
    pub snapshot: MatchSnapshot,
    /// Set when this operation resolved a round.
    pub resolved_round: Option<RoundRecord>,
}
