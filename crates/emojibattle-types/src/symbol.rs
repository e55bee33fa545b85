//! Symbols players pick and the outcome of comparing two of them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A symbol a player can submit (e.g. `"rock"` or `"🪨"`).
///
/// Validity is decided by the active rule set, not by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Result of resolving symbol `a` against symbol `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// `a` beats `b`.
    WinA,
    /// `b` beats `a`.
    WinB,
    /// Same symbol on both sides.
    Draw,
}

impl Outcome {
    /// The same outcome seen from the other side.
    #[must_use]
    pub fn flip(self) -> Self {
        match self {
            Self::WinA => Self::WinB,
            Self::WinB => Self::WinA,
            Self::Draw => Self::Draw,
        }
    }

    #[must_use]
    pub fn is_draw(self) -> bool {
        self == Self::Draw
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WinA => write!(f, "WIN_A"),
            Self::WinB => write!(f, "WIN_B"),
            Self::Draw => write!(f, "DRAW"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_is_involution() {
        for outcome in [Outcome::WinA, Outcome::WinB, Outcome::Draw] {
            assert_eq!(outcome.flip().flip(), outcome);
        }
        assert_eq!(Outcome::WinA.flip(), Outcome::WinB);
        assert!(Outcome::Draw.flip().is_draw());
    }

    #[test]
    fn outcome_display() {
        assert_eq!(format!("{}", Outcome::WinA), "WIN_A");
        assert_eq!(format!("{}", Outcome::WinB), "WIN_B");
        assert_eq!(format!("{}", Outcome::Draw), "DRAW");
    }
}
