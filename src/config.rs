//! # Manager configuration.
//!
//! Provides [`ManagerConfig`], the centralized knobs for the lifecycle manager.
//!
//! ## Field semantics
//! - `poll_interval`: cadence of the background fetch-and-evaluate loop
//! - `fetch_timeout`: upper bound on a single source fetch (`0s` = no bound)
//! - `alert_cooldown`: minimum gap between two user-facing alerts (global
//!   across all alert kinds, matching the product's "don't spam" intent)
//! - `soon_threshold_days`: days before the period end at which an active
//!   subscription counts as expiring soon
//! - `grace_period_days`: days after expiration before the backend is expected
//!   to auto-cancel
//! - `bus_capacity`: ring-buffer size of each event channel (min 1)
//! - `failure_backoff`: retry spacing after consecutive failed cycles; the
//!   effective delay is additionally capped at `poll_interval`

use std::time::Duration;

use crate::policies::BackoffPolicy;

/// Configuration for a [`LifecycleManager`](crate::LifecycleManager).
///
/// All fields are public; construct with `ManagerConfig::default()` and
/// override what the host application needs.
#[derive(Clone, Debug)]
pub struct ManagerConfig {
    /// Interval between scheduled polling cycles.
    pub poll_interval: Duration,

    /// Maximum time one source fetch may take before the cycle counts as failed.
    ///
    /// `Duration::ZERO` disables the bound (not recommended: a stuck fetch
    /// would stall the loop).
    pub fetch_timeout: Duration,

    /// Minimum time between two consecutive user-facing alerts.
    pub alert_cooldown: Duration,

    /// Days before `current_period_end` at which an active subscription is
    /// considered "expiring soon".
    pub soon_threshold_days: i64,

    /// Days after expiration during which renewal is still possible before the
    /// subscription is treated as auto-cancelled.
    pub grace_period_days: i64,

    /// Capacity of each event broadcast channel (alerts, activations).
    pub bus_capacity: usize,

    /// Retry spacing after consecutive fetch failures.
    pub failure_backoff: BackoffPolicy,
}

impl ManagerConfig {
    /// Returns the fetch timeout as an `Option` (`None` = unbounded).
    #[inline]
    pub fn fetch_timeout_opt(&self) -> Option<Duration> {
        if self.fetch_timeout == Duration::ZERO {
            None
        } else {
            Some(self.fetch_timeout)
        }
    }

    /// Delay before the next cycle after `failures` consecutive failed cycles.
    ///
    /// Zero failures yields the regular poll interval; otherwise the backoff
    /// delay, capped at the poll interval so a failing network never stretches
    /// the cadence.
    #[inline]
    pub fn next_delay(&self, failures: u32) -> Duration {
        if failures == 0 {
            self.poll_interval
        } else {
            self.failure_backoff.next(failures).min(self.poll_interval)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for ManagerConfig {
    /// Default configuration:
    ///
    /// - `poll_interval = 30min`
    /// - `fetch_timeout = 15s`
    /// - `alert_cooldown = 1h`
    /// - `soon_threshold_days = 7`
    /// - `grace_period_days = 3`
    /// - `bus_capacity = 64`
    /// - `failure_backoff = BackoffPolicy::default()` (30s doubling, 10min cap)
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30 * 60),
            fetch_timeout: Duration::from_secs(15),
            alert_cooldown: Duration::from_secs(60 * 60),
            soon_threshold_days: 7,
            grace_period_days: 3,
            bus_capacity: 64,
            failure_backoff: BackoffPolicy::default(),
        }
    }
}
