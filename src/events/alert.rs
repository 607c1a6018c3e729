//! Expiration and cancellation alerts shown to the user.
//!
//! An [`Alert`] is the only user-visible output of the manager besides
//! activation pulses. Emission is gated by the global cooldown (see
//! `manager::rules`); the types here are plain data.

use chrono::{DateTime, Utc};

/// Classification of a user-facing alert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKind {
    /// Subscription is active but within the soon-threshold of its period end.
    ExpiresSoon {
        /// Whole days left until the period end.
        days_left: i64,
    },

    /// Subscription expired; renewal is still possible for `days_left` days
    /// before the backend auto-cancels it.
    GraceRemaining {
        /// Whole days left before auto-cancellation.
        days_left: i64,
    },

    /// The grace period lapsed and the backend confirmed the subscription was
    /// auto-cancelled. Emitted at most once per expiration episode.
    AutoCanceled,
}

/// A throttled user-facing warning decided by one polling cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    /// What the alert is about.
    pub kind: AlertKind,
    /// When the loop decided to emit it.
    pub at: DateTime<Utc>,
}

impl Alert {
    /// Creates an alert stamped with the deciding cycle's clock.
    pub fn new(kind: AlertKind, at: DateTime<Utc>) -> Self {
        Self { kind, at }
    }

    /// Renders the user-facing message text.
    pub fn message(&self) -> String {
        match self.kind {
            AlertKind::ExpiresSoon { days_left } => match days_left {
                0 => "Your subscription expires today. Renew to keep your professional profile visible.".to_string(),
                1 => "Your subscription expires tomorrow. Renew to keep your professional profile visible.".to_string(),
                n => format!(
                    "Your subscription expires in {n} days. Renew to keep your professional profile visible."
                ),
            },
            AlertKind::GraceRemaining { days_left } => match days_left {
                1 => "Your subscription has expired. 1 day remaining before it is auto-cancelled.".to_string(),
                n => format!(
                    "Your subscription has expired. {n} days remaining before it is auto-cancelled."
                ),
            },
            AlertKind::AutoCanceled => {
                "Your subscription was auto-cancelled after the grace period. Re-subscribe to restore your professional role.".to_string()
            }
        }
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}
