//! Rule sets: the valid symbols and the beats-relation between them.
//!
//! A rule set is loaded once at startup and never changes. Loading fails
//! fast if the relation is not a tournament, i.e. if any two distinct
//! symbols do not have exactly one winner between them.
//!
//! The on-disk format is the one the game service ships in `rules.json`:
//!
//! ```json
//! { "emojis": ["🪨", "📄", "✂️"],
//!   "winsAgainst": { "🪨": ["✂️"], "📄": ["🪨"], "✂️": ["📄"] } }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use emojibattle_types::{MatchError, Outcome, Result, Symbol, constants};
use serde::{Deserialize, Serialize};

/// Raw rule set as read from configuration, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSetConfig {
    /// Valid symbols, in display order.
    pub emojis: Vec<Symbol>,
    /// `symbol -> symbols it beats`.
    #[serde(rename = "winsAgainst")]
    pub wins_against: BTreeMap<Symbol, Vec<Symbol>>,
}

/// Validated, immutable rule set.
#[derive(Debug, Clone)]
pub struct RuleSet {
    symbols: Vec<Symbol>,
    index: HashMap<Symbol, usize>,
    /// Row-major `n x n` matrix: `beats[a * n + b]` iff `a` beats `b`.
    beats: Vec<bool>,
}

impl RuleSet {
    /// Validate a raw configuration into a rule set.
    ///
    /// # Errors
    /// [`MatchError::Configuration`] if there are fewer than
    /// [`constants::MIN_SYMBOLS`] symbols, a blank or duplicate symbol, an
    /// unknown symbol in the relation, a symbol beating itself, or a pair
    /// of distinct symbols where both or neither beat the other.
    pub fn from_config(config: &RuleSetConfig) -> Result<Self> {
        let n = config.emojis.len();
        if n < constants::MIN_SYMBOLS {
            return Err(MatchError::Configuration(format!(
                "rule set needs at least {} symbols, got {n}",
                constants::MIN_SYMBOLS
            )));
        }

        let mut index = HashMap::with_capacity(n);
        for (i, symbol) in config.emojis.iter().enumerate() {
            if symbol.as_str().trim().is_empty() {
                return Err(MatchError::Configuration(
                    "rule set contains a blank symbol".to_string(),
                ));
            }
            if index.insert(symbol.clone(), i).is_some() {
                return Err(MatchError::Configuration(format!(
                    "duplicate symbol {symbol:?}"
                )));
            }
        }

        let lookup = |symbol: &Symbol| {
            index.get(symbol).copied().ok_or_else(|| {
                MatchError::Configuration(format!("winsAgainst references unknown symbol {symbol:?}"))
            })
        };

        let mut beats = vec![false; n * n];
        for (winner, losers) in &config.wins_against {
            let w = lookup(winner)?;
            for loser in losers {
                let l = lookup(loser)?;
                if w == l {
                    return Err(MatchError::Configuration(format!(
                        "symbol {winner:?} cannot beat itself"
                    )));
                }
                beats[w * n + l] = true;
            }
        }

        for a in 0..n {
            for b in (a + 1)..n {
                match (beats[a * n + b], beats[b * n + a]) {
                    (true, false) | (false, true) => {}
                    (true, true) => {
                        return Err(MatchError::Configuration(format!(
                            "{:?} and {:?} beat each other",
                            config.emojis[a], config.emojis[b]
                        )));
                    }
                    (false, false) => {
                        return Err(MatchError::Configuration(format!(
                            "no winner defined between {:?} and {:?}",
                            config.emojis[a], config.emojis[b]
                        )));
                    }
                }
            }
        }

        Ok(Self {
            symbols: config.emojis.clone(),
            index,
            beats,
        })
    }

    /// Parse and validate a JSON rule document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RuleSetConfig = serde_json::from_str(json)?;
        Self::from_config(&config)
    }

    /// Read, parse, and validate a JSON rule file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    /// Rock / paper / scissors.
    #[must_use]
    pub fn classic() -> Self {
        Self::built_in(&[
            ("rock", &["scissors"]),
            ("paper", &["rock"]),
            ("scissors", &["paper"]),
        ])
    }

    /// Rock / paper / scissors / lizard / spock.
    #[must_use]
    pub fn extended() -> Self {
        Self::built_in(&[
            ("rock", &["scissors", "lizard"]),
            ("paper", &["rock", "spock"]),
            ("scissors", &["paper", "lizard"]),
            ("lizard", &["spock", "paper"]),
            ("spock", &["scissors", "rock"]),
        ])
    }

    fn built_in(table: &[(&str, &[&str])]) -> Self {
        let config = RuleSetConfig {
            emojis: table.iter().map(|(s, _)| Symbol::from(*s)).collect(),
            wins_against: table
                .iter()
                .map(|(s, losers)| {
                    (
                        Symbol::from(*s),
                        losers.iter().map(|l| Symbol::from(*l)).collect(),
                    )
                })
                .collect(),
        };
        Self::from_config(&config).expect("built-in rule set is a valid tournament")
    }

    /// Symbols in configuration order.
    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    #[must_use]
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.index.contains_key(symbol)
    }

    /// Whether `a` beats `b`. Unknown symbols beat nothing.
    #[must_use]
    pub fn beats(&self, a: &Symbol, b: &Symbol) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&a), Some(&b)) => self.beats[a * self.symbols.len() + b],
            _ => false,
        }
    }

    /// Resolve `a` against `b`.
    ///
    /// # Errors
    /// [`MatchError::InvalidInput`] if either symbol is not in the rule set.
    pub fn resolve(&self, a: &Symbol, b: &Symbol) -> Result<Outcome> {
        for symbol in [a, b] {
            if !self.contains(symbol) {
                return Err(MatchError::invalid_input(format!(
                    "unknown symbol {symbol:?}"
                )));
            }
        }
        Ok(if a == b {
            Outcome::Draw
        } else if self.beats(a, b) {
            Outcome::WinA
        } else {
            Outcome::WinB
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sym(s: &str) -> Symbol {
        Symbol::from(s)
    }

    fn config(emojis: &[&str], wins: &[(&str, &[&str])]) -> RuleSetConfig {
        RuleSetConfig {
            emojis: emojis.iter().map(|s| sym(s)).collect(),
            wins_against: wins
                .iter()
                .map(|(w, ls)| (sym(w), ls.iter().map(|l| sym(l)).collect()))
                .collect(),
        }
    }

    #[test]
    fn classic_resolution() {
        let rules = RuleSet::classic();
        assert_eq!(rules.resolve(&sym("rock"), &sym("scissors")).unwrap(), Outcome::WinA);
        assert_eq!(rules.resolve(&sym("rock"), &sym("paper")).unwrap(), Outcome::WinB);
        assert_eq!(rules.resolve(&sym("paper"), &sym("paper")).unwrap(), Outcome::Draw);
    }

    #[test]
    fn unknown_symbol_is_invalid_input() {
        let rules = RuleSet::classic();
        let err = rules.resolve(&sym("rock"), &sym("dynamite")).unwrap_err();
        assert!(matches!(err, MatchError::InvalidInput { .. }));
        assert!(!rules.contains(&sym("dynamite")));
        assert!(!rules.beats(&sym("dynamite"), &sym("rock")));
    }

    #[test]
    fn too_few_symbols_rejected() {
        let cfg = config(&["rock", "paper"], &[("paper", &["rock"])]);
        assert!(matches!(RuleSet::from_config(&cfg), Err(MatchError::Configuration(_))));
    }

    #[test]
    fn duplicate_symbol_rejected() {
        let cfg = config(
            &["rock", "paper", "rock"],
            &[("paper", &["rock"])],
        );
        let err = RuleSet::from_config(&cfg).unwrap_err();
        assert!(format!("{err}").contains("duplicate"), "{err}");
    }

    #[test]
    fn missing_pair_rejected() {
        let cfg = config(
            &["rock", "paper", "scissors"],
            &[("rock", &["scissors"]), ("paper", &["rock"])],
        );
        let err = RuleSet::from_config(&cfg).unwrap_err();
        assert!(format!("{err}").contains("no winner"), "{err}");
    }

    #[test]
    fn symmetric_pair_rejected() {
        let cfg = config(
            &["rock", "paper", "scissors"],
            &[
                ("rock", &["scissors", "paper"]),
                ("paper", &["rock"]),
                ("scissors", &["paper"]),
            ],
        );
        let err = RuleSet::from_config(&cfg).unwrap_err();
        assert!(format!("{err}").contains("beat each other"), "{err}");
    }

    #[test]
    fn self_beat_rejected() {
        let cfg = config(
            &["rock", "paper", "scissors"],
            &[
                ("rock", &["scissors", "rock"]),
                ("paper", &["rock"]),
                ("scissors", &["paper"]),
            ],
        );
        assert!(RuleSet::from_config(&cfg).is_err());
    }

    #[test]
    fn unknown_symbol_in_relation_rejected() {
        let cfg = config(
            &["rock", "paper", "scissors"],
            &[
                ("rock", &["scissors"]),
                ("paper", &["rock"]),
                ("scissors", &["paper", "well"]),
            ],
        );
        let err = RuleSet::from_config(&cfg).unwrap_err();
        assert!(format!("{err}").contains("unknown symbol"), "{err}");
    }

    #[test]
    fn malformed_json_is_configuration_error() {
        let err = RuleSet::from_json("{ not json").unwrap_err();
        assert!(matches!(err, MatchError::Configuration(_)));
    }

    #[test]
    fn shipped_rule_file_is_valid() {
        let rules =
            RuleSet::from_json(include_str!("../../../config/rules.json")).unwrap();
        assert_eq!(rules.symbols().len(), 5);
        assert_eq!(rules.resolve(&sym("🪨"), &sym("✂️")).unwrap(), Outcome::WinA);
        assert_eq!(rules.resolve(&sym("🖖"), &sym("🪨")).unwrap(), Outcome::WinA);
    }

    #[test]
    fn missing_rule_file_is_configuration_error() {
        let err = RuleSet::from_path("/nonexistent/rules.json").unwrap_err();
        assert!(matches!(err, MatchError::Configuration(_)));
    }

    proptest! {
        #[test]
        fn exactly_one_direction_wins(a in 0usize..5, b in 0usize..5) {
            let rules = RuleSet::extended();
            let sa = rules.symbols()[a].clone();
            let sb = rules.symbols()[b].clone();
            let ab = rules.resolve(&sa, &sb).unwrap();
            let ba = rules.resolve(&sb, &sa).unwrap();
            if a == b {
                prop_assert_eq!(ab, Outcome::Draw);
            } else {
                prop_assert!(!ab.is_draw());
                prop_assert_eq!(ab, ba.flip());
                prop_assert!(rules.beats(&sa, &sb) ^ rules.beats(&sb, &sa));
            }
        }
    }
}
