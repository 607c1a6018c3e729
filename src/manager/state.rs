//! Mutable state exclusively owned by the manager.

use chrono::{DateTime, Utc};

use crate::{
    events::Alert,
    snapshot::{Snapshot, Status},
};

/// Everything the manager remembers between cycles.
///
/// Created on initialization, wiped entirely by `clear()` on sign-out.
/// Writes happen only on the poller task; reads clone out through the
/// manager's facade.
#[derive(Debug, Default)]
pub(crate) struct ManagerState {
    /// Latest snapshot, or `None` if never fetched / no subscription.
    pub current: Option<Snapshot>,

    /// When the last user-facing alert was emitted (any kind; the cooldown is
    /// global per manager).
    pub last_alert_at: Option<DateTime<Utc>>,

    /// Most recent alert not yet acknowledged by a consumer.
    pub pending_alert: Option<Alert>,

    /// Whether the auto-cancel alert already fired for the current expiration
    /// episode. Reset as soon as a non-lapsed status is observed.
    pub auto_cancel_alerted: bool,
}

impl ManagerState {
    /// Status of the held snapshot, or [`Status::None`] when nothing was
    /// fetched yet.
    pub fn status(&self) -> Status {
        self.current.as_ref().map(|s| s.status).unwrap_or_default()
    }
}
