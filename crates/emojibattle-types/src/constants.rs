//! Engine-wide constants for the Emoji Battle match engine.

/// Number of player slots in a match.
pub const MAX_PLAYERS: usize = 2;

/// Minimum number of symbols a rule set must define.
pub const MIN_SYMBOLS: usize = 3;

/// Default match length: best-of-3, first to 2 round wins.
pub const DEFAULT_BEST_OF: u32 = 3;

/// Default idempotency ledger capacity (number of ledgered operations to remember).
pub const DEFAULT_LEDGER_CAPACITY: usize = 1_000_000;

/// Default number of rejected requests retained by the error journal.
pub const DEFAULT_ERROR_JOURNAL_CAPACITY: usize = 1_000;

/// Default number of reload-and-retry attempts after a version conflict.
pub const DEFAULT_CAS_RETRY_LIMIT: u32 = 3;

/// Default upper bound on a single event append, in milliseconds.
pub const DEFAULT_APPEND_TIMEOUT_MS: u64 = 2_000;

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "EMOJIBATTLE_";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "EmojiBattle";
