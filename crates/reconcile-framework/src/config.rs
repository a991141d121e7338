//! # Configuration
//!
//! Per-operation deadlines and the poll schedule. Both are plain `serde` structs so
//! a caller can load them from whatever configuration source it already has; every
//! field has a default, so an empty document is valid.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 30 * 60;

/// Independent deadlines for the create, update, and delete waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub create_secs: u64,
    pub update_secs: u64,
    pub delete_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create_secs: DEFAULT_OPERATION_TIMEOUT_SECS,
            update_secs: DEFAULT_OPERATION_TIMEOUT_SECS,
            delete_secs: DEFAULT_OPERATION_TIMEOUT_SECS,
        }
    }
}

impl Timeouts {
    pub fn create(&self) -> Duration {
        Duration::from_secs(self.create_secs)
    }

    pub fn update(&self) -> Duration {
        Duration::from_secs(self.update_secs)
    }

    pub fn delete(&self) -> Duration {
        Duration::from_secs(self.delete_secs)
    }
}

/// How often the waiter polls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollPolicy {
    /// Pause before the first poll.
    pub delay_ms: u64,
    /// Base pause between polls.
    pub interval_ms: u64,
    /// Proportional jitter applied to each interval, clamped to `[0.0, 1.0]`. A
    /// non-finite value disables jitter.
    pub jitter: f64,
    /// Consecutive "not found" observations tolerated while waiting for a
    /// resource that should exist. Zero makes the first one terminal.
    pub not_found_checks: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            delay_ms: 0,
            interval_ms: 10_000,
            jitter: 0.1,
            not_found_checks: 0,
        }
    }
}

impl PollPolicy {
    /// A jitter-free policy polling every `interval`.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            delay_ms: 0,
            interval_ms: interval.as_millis() as u64,
            jitter: 0.0,
            not_found_checks: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// The pause before the next poll, with jitter applied.
    pub fn next_interval(&self) -> Duration {
        let base = Duration::from_millis(self.interval_ms);
        if !self.jitter.is_finite() || self.interval_ms == 0 {
            return base;
        }
        let jitter = self.jitter.clamp(0.0, 1.0);
        if jitter == 0.0 {
            return base;
        }
        let factor = rand::thread_rng().gen_range((1.0 - jitter)..=(1.0 + jitter));
        Duration::try_from_secs_f64(base.as_secs_f64() * factor).unwrap_or(Duration::MAX)
    }
}
