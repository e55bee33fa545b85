//! Engine configuration.
//!
//! Values default to [`crate::constants`] and can be overridden from
//! `EMOJIBATTLE_*` environment variables by the hosting service.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{MatchError, Result, constants};

/// Configuration for one match coordinator instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum rounds per match. Must be odd; first to `best_of / 2 + 1` wins.
    pub best_of: u32,
    /// Number of ledgered operations remembered for idempotent replay.
    pub ledger_capacity: usize,
    /// Number of rejected requests kept for debug tooling.
    pub error_journal_capacity: usize,
    /// Reload-and-retry attempts after losing a version compare-and-swap.
    pub cas_retry_limit: u32,
    /// Upper bound on one event append while the match is held.
    pub append_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            best_of: constants::DEFAULT_BEST_OF,
            ledger_capacity: constants::DEFAULT_LEDGER_CAPACITY,
            error_journal_capacity: constants::DEFAULT_ERROR_JOURNAL_CAPACITY,
            cas_retry_limit: constants::DEFAULT_CAS_RETRY_LIMIT,
            append_timeout: Duration::from_millis(constants::DEFAULT_APPEND_TIMEOUT_MS),
        }
    }
}

impl EngineConfig {
    /// Round wins needed to take the match.
    #[must_use]
    pub fn wins_needed(&self) -> u32 {
        self.best_of / 2 + 1
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.best_of == 0 || self.best_of % 2 == 0 {
            return Err(MatchError::Configuration(format!(
                "best_of must be a positive odd number, got {}",
                self.best_of
            )));
        }
        if self.ledger_capacity == 0 {
            return Err(MatchError::Configuration(
                "ledger_capacity must be > 0".to_string(),
            ));
        }
        if self.error_journal_capacity == 0 {
            return Err(MatchError::Configuration(
                "error_journal_capacity must be > 0".to_string(),
            ));
        }
        if self.append_timeout.is_zero() {
            return Err(MatchError::Configuration(
                "append_timeout must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Build from the process environment (`EMOJIBATTLE_BEST_OF`,
    /// `EMOJIBATTLE_LEDGER_CAPACITY`, `EMOJIBATTLE_ERROR_JOURNAL_CAPACITY`,
    /// `EMOJIBATTLE_CAS_RETRY_LIMIT`, `EMOJIBATTLE_APPEND_TIMEOUT_MS`).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let append_timeout_ms = parse_override(
            &lookup,
            "APPEND_TIMEOUT_MS",
            constants::DEFAULT_APPEND_TIMEOUT_MS,
        )?;
        let config = Self {
            best_of: parse_override(&lookup, "BEST_OF", defaults.best_of)?,
            ledger_capacity: parse_override(&lookup, "LEDGER_CAPACITY", defaults.ledger_capacity)?,
            error_journal_capacity: parse_override(
                &lookup,
                "ERROR_JOURNAL_CAPACITY",
                defaults.error_journal_capacity,
            )?,
            cas_retry_limit: parse_override(&lookup, "CAS_RETRY_LIMIT", defaults.cas_retry_limit)?,
            append_timeout: Duration::from_millis(append_timeout_ms),
        };
        config.validate()?;
        Ok(config)
    }
}

fn parse_override<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let key = format!("{}{name}", constants::ENV_PREFIX);
    match lookup(&key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| MatchError::Configuration(format!("{key}={raw:?}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.best_of, 3);
        assert_eq!(cfg.wins_needed(), 2);
        assert_eq!(cfg.append_timeout.as_millis(), 2000);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn wins_needed_is_majority() {
        let cfg = EngineConfig {
            best_of: 5,
            ..EngineConfig::default()
        };
        assert_eq!(cfg.wins_needed(), 3);
        let cfg = EngineConfig {
            best_of: 1,
            ..EngineConfig::default()
        };
        assert_eq!(cfg.wins_needed(), 1);
    }

    #[test]
    fn even_best_of_rejected() {
        let cfg = EngineConfig {
            best_of: 4,
            ..EngineConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(MatchError::Configuration(_))));
    }

    #[test]
    fn lookup_overrides() {
        let env: HashMap<&str, &str> = [
            ("EMOJIBATTLE_BEST_OF", "5"),
            ("EMOJIBATTLE_APPEND_TIMEOUT_MS", "250"),
        ]
        .into_iter()
        .collect();
        let cfg = EngineConfig::from_lookup(|k| env.get(k).map(ToString::to_string)).unwrap();
        assert_eq!(cfg.best_of, 5);
        assert_eq!(cfg.append_timeout, Duration::from_millis(250));
        assert_eq!(cfg.ledger_capacity, constants::DEFAULT_LEDGER_CAPACITY);
    }

    #[test]
    fn lookup_rejects_garbage() {
        let err = EngineConfig::from_lookup(|k| {
            (k == "EMOJIBATTLE_LEDGER_CAPACITY").then(|| "lots".to_string())
        })
        .unwrap_err();
        assert!(format!("{err}").contains("EMOJIBATTLE_LEDGER_CAPACITY"));
    }

    #[test]
    fn config_serde_roundtrip() {
        let cfg = EngineConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
