use std::time::Duration;

/// Default pass interval: 30 minutes.
const DEFAULT_SYNC_INTERVAL_SECS: u64 = 1800;

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Time between the start of two passes.
    pub sync_interval: Duration,
    /// Run a pass immediately at startup instead of waiting one interval.
    pub sync_on_start: bool,
}

impl WorkerConfig {
    /// | Env Var              | Default |
    /// |----------------------|---------|
    /// | `SYNC_INTERVAL_SECS` | `1800`  |
    /// | `SYNC_ON_START`      | `true`  |
    pub fn from_env() -> Self {
        let interval_secs: u64 = std::env::var("SYNC_INTERVAL_SECS")
            .ok()
            .map(|v| v.parse().expect("SYNC_INTERVAL_SECS must be a valid u64"))
            .unwrap_or(DEFAULT_SYNC_INTERVAL_SECS);

        let sync_on_start = std::env::var("SYNC_ON_START")
            .map(|v| !matches!(v.trim(), "0" | "false" | "no"))
            .unwrap_or(true);

        Self {
            sync_interval: Duration::from_secs(interval_secs.max(1)),
            sync_on_start,
        }
    }
}
