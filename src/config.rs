//! Runtime settings parsed from environment variables.
//!
//! Every key is optional; unparseable values fall back to the default rather
//! than failing startup.

use std::time::Duration;

pub const DEFAULT_TOKEN_TTL_SECS: u32 = 15;
pub const DEFAULT_FILL_IN_PROBABILITY: f64 = 0.3;
pub const DEFAULT_FILL_IN_MAX_BATCH: usize = 3;
pub const DEFAULT_HISTORY_CAP: usize = 5;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_SCAN_DELAY_MS: u64 = 0;
pub const DEFAULT_RADIUS_METERS: f64 = 50.0;
pub const DEFAULT_ENDED_RETENTION_SECS: u64 = 3600;

/// Simulated unsolicited check-ins applied on each token rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillInPolicy {
    /// Chance, in `[0, 1]`, that a rotation fills in any students at all.
    pub probability: f64,
    /// Upper bound on students filled in by a single rotation.
    pub max_batch: usize,
}

impl FillInPolicy {
    /// No simulated check-ins.
    #[must_use]
    pub fn disabled() -> Self {
        Self { probability: 0.0, max_batch: 0 }
    }
}

impl Default for FillInPolicy {
    fn default() -> Self {
        Self { probability: DEFAULT_FILL_IN_PROBABILITY, max_batch: DEFAULT_FILL_IN_MAX_BATCH }
    }
}

/// Per-session knobs handed to every new `Session`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    /// Ticks between token rotations.
    pub token_ttl_secs: u32,
    pub fill_in: FillInPolicy,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self { token_ttl_secs: DEFAULT_TOKEN_TTL_SECS, fill_in: FillInPolicy::default() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollcallConfig {
    pub session: SessionSettings,
    /// Entries kept in a student's recent-attendance list.
    pub history_cap: usize,
    /// Cadence of the background rotation task.
    pub tick_interval: Duration,
    /// Simulated camera time before a scanned code is read.
    pub scan_delay: Duration,
    /// Radius used when the caller does not supply one.
    pub default_radius_meters: f64,
    /// How long ended sessions stay queryable before the rotation task drops them.
    pub ended_retention: Duration,
}

impl Default for RollcallConfig {
    fn default() -> Self {
        Self {
            session: SessionSettings::default(),
            history_cap: DEFAULT_HISTORY_CAP,
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            scan_delay: Duration::from_millis(DEFAULT_SCAN_DELAY_MS),
            default_radius_meters: DEFAULT_RADIUS_METERS,
            ended_retention: Duration::from_secs(DEFAULT_ENDED_RETENTION_SECS),
        }
    }
}

impl RollcallConfig {
    /// Build config from process environment variables.
    ///
    /// Optional:
    /// - `ROLLCALL_TOKEN_TTL_SECS`: default 15, minimum 1
    /// - `ROLLCALL_FILL_IN_PROBABILITY`: default 0.3, clamped to `[0, 1]`
    /// - `ROLLCALL_FILL_IN_MAX_BATCH`: default 3
    /// - `ROLLCALL_HISTORY_CAP`: default 5, minimum 1
    /// - `ROLLCALL_TICK_INTERVAL_MS`: default 1000, minimum 1
    /// - `ROLLCALL_SCAN_DELAY_MS`: default 0
    /// - `ROLLCALL_DEFAULT_RADIUS_METERS`: default 50; non-positive values ignored
    /// - `ROLLCALL_ENDED_RETENTION_SECS`: default 3600
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let token_ttl_secs = env_parse(&lookup, "ROLLCALL_TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS).max(1);
        let probability =
            clamp_probability(env_parse(&lookup, "ROLLCALL_FILL_IN_PROBABILITY", DEFAULT_FILL_IN_PROBABILITY));
        let max_batch = env_parse(&lookup, "ROLLCALL_FILL_IN_MAX_BATCH", DEFAULT_FILL_IN_MAX_BATCH);
        let history_cap = env_parse(&lookup, "ROLLCALL_HISTORY_CAP", DEFAULT_HISTORY_CAP).max(1);
        let tick_interval_ms = env_parse(&lookup, "ROLLCALL_TICK_INTERVAL_MS", DEFAULT_TICK_INTERVAL_MS).max(1);
        let scan_delay_ms = env_parse(&lookup, "ROLLCALL_SCAN_DELAY_MS", DEFAULT_SCAN_DELAY_MS);
        let radius = env_parse(&lookup, "ROLLCALL_DEFAULT_RADIUS_METERS", DEFAULT_RADIUS_METERS);
        let default_radius_meters = if radius.is_finite() && radius > 0.0 { radius } else { DEFAULT_RADIUS_METERS };
        let ended_retention_secs = env_parse(&lookup, "ROLLCALL_ENDED_RETENTION_SECS", DEFAULT_ENDED_RETENTION_SECS);

        Self {
            session: SessionSettings { token_ttl_secs, fill_in: FillInPolicy { probability, max_batch } },
            history_cap,
            tick_interval: Duration::from_millis(tick_interval_ms),
            scan_delay: Duration::from_millis(scan_delay_ms),
            default_radius_meters,
            ended_retention: Duration::from_secs(ended_retention_secs),
        }
    }
}

fn env_parse<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() { DEFAULT_FILL_IN_PROBABILITY } else { p.clamp(0.0, 1.0) }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
