//! Immutable record of a subscription as last observed from the server.
//!
//! A [`Snapshot`] is produced by the external subscription source once per
//! fetch. Derived values (`days_until_expiration`, `will_expire_soon`,
//! `is_expired`) are computed on demand from the stored fields and an explicit
//! `now`, which keeps the expiration arithmetic deterministic under test.
//!
//! ## Rules
//! - Period timestamps are `Option`: a field the backend omits decodes to
//!   `None`. A present-but-malformed timestamp fails deserialization, which
//!   sources surface as a decode error (the whole fetch is skipped).
//! - An absent period end disables the expires-soon countdown; an `Expired`
//!   snapshot without one counts as just expired (day 0 of the grace period).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::snapshot::Status;

/// The server's view of a subscription at one point in time.
///
/// Immutable once constructed. The manager replaces its held snapshot on every
/// successful fetch instead of mutating it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Professional role tied to the subscription (e.g. `"vet"`, `"sitter"`).
    ///
    /// Meaningful only while [`Status::is_active_like`] holds.
    #[serde(default)]
    pub role: Option<String>,

    /// Lifecycle state as reported by the backend.
    pub status: Status,

    /// Start of the current billing period, if known.
    #[serde(default)]
    pub current_period_start: Option<DateTime<Utc>>,

    /// End of the current billing period, if known.
    #[serde(default)]
    pub current_period_end: Option<DateTime<Utc>>,

    /// True if the subscription is scheduled to stop renewing at period end.
    #[serde(default)]
    pub cancel_at_period_end: bool,
}

impl Snapshot {
    /// Builds a snapshot with just a status, no period information.
    pub fn with_status(status: Status) -> Self {
        Self {
            role: None,
            status,
            current_period_start: None,
            current_period_end: None,
            cancel_at_period_end: false,
        }
    }

    /// Whole days until `current_period_end`, negative once past it.
    ///
    /// `None` when the period end is unknown.
    pub fn days_until_expiration(&self, now: DateTime<Utc>) -> Option<i64> {
        self.current_period_end.map(|end| (end - now).num_days())
    }

    /// Whole days elapsed since `current_period_end`.
    ///
    /// `None` when the period end is unknown, or when it is still in the future.
    pub fn days_since_expiration(&self, now: DateTime<Utc>) -> Option<i64> {
        match self.current_period_end {
            Some(end) if now >= end => Some((now - end).num_days()),
            _ => None,
        }
    }

    /// True when the subscription is active-like and within `threshold_days`
    /// of its period end.
    pub fn will_expire_soon(&self, now: DateTime<Utc>, threshold_days: i64) -> bool {
        if !self.status.is_active_like() {
            return false;
        }
        match self.days_until_expiration(now) {
            Some(days) => (0..=threshold_days).contains(&days),
            None => false,
        }
    }

    /// True when `current_period_end` is in the past.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.current_period_end, Some(end) if end < now)
    }
}
