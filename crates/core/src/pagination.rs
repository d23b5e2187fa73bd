//! Limit defaults for list endpoints.

/// Default number of change log entries returned.
pub const DEFAULT_CHANGE_LOG_LIMIT: i64 = 50;

/// Maximum number of change log entries returned in one call.
pub const MAX_CHANGE_LOG_LIMIT: i64 = 500;

/// Default number of sync runs returned by history queries.
pub const DEFAULT_SYNC_HISTORY_LIMIT: i64 = 20;

/// Maximum number of sync runs returned by history queries.
pub const MAX_SYNC_HISTORY_LIMIT: i64 = 100;

/// Clamp a user-provided limit to `[1, max]`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}
