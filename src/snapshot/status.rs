//! Lifecycle states reported by the billing backend.
//!
//! The backend is authoritative: the manager never computes transitions itself,
//! it only observes the sequence of statuses across fetches and reacts.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a subscription as last reported by the server.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// No subscription has ever been created for this account.
    #[default]
    None,
    /// Subscription created, payment not yet confirmed.
    Pending,
    /// Subscription is active.
    Active,
    /// Active, but within the soon-threshold of the period end.
    ExpiresSoon,
    /// Past the period end, not yet cancelled by the backend.
    Expired,
    /// Terminal: the professional role has been downgraded.
    ///
    /// Terminal until the user re-subscribes; a fresh snapshot reporting
    /// `Pending` or `Active` restarts the cycle.
    Canceled,
}

impl Status {
    /// True for states in which the subscription grants the professional role.
    pub fn is_active_like(&self) -> bool {
        matches!(self, Status::Active | Status::ExpiresSoon)
    }

    /// True once the subscription has lapsed (expired or cancelled).
    pub fn is_lapsed(&self) -> bool {
        matches!(self, Status::Expired | Status::Canceled)
    }
}
