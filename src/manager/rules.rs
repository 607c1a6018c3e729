//! Evaluation rules applied to each freshly fetched snapshot.
//!
//! These functions are pure with respect to time: callers pass an explicit
//! `now`, which keeps the activation-edge, cooldown and grace-period
//! arithmetic deterministic under test. The poller supplies the wall clock.
//!
//! ## Decision flow
//! ```text
//! apply_snapshot(state, snapshot, now):
//!   ├─► activation edge?   prev != Active && new == Active → pulse (one-shot)
//!   ├─► reset auto-cancel flag when status is no longer lapsed
//!   ├─► replace state.current (always, even if the alert is suppressed)
//!   └─► alert candidate:
//!         Active/ExpiresSoon within threshold → ExpiresSoon { days }
//!           (end unknown → skip: no basis for a countdown)
//!         Expired, days < grace              → GraceRemaining { grace - days }
//!         Expired, days >= grace             → follow-up: recheck for Canceled
//!           (end unknown → day 0: the status is authoritative, so the
//!            subscription counts as just expired)
//!       candidate → cooldown gate → pending alert + last_alert_at
//!
//! apply_recheck(state, snapshot, now):
//!   Canceled  → AutoCanceled alert, at most once per expiration episode,
//!               bypassing the cooldown if this episode has not alerted yet
//!   otherwise → regular apply_snapshot (covers renewal during grace),
//!               with no further follow-up this cycle
//! ```

use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::debug;

use crate::{
    config::ManagerConfig,
    events::{Activation, Alert, AlertKind},
    manager::state::ManagerState,
    snapshot::{Snapshot, Status},
};

/// Follow-up work a cycle must perform after applying a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FollowUp {
    /// Grace period elapsed: re-fetch once to check whether the backend has
    /// transitioned the subscription to `Canceled`.
    CancelRecheck,
}

/// What one snapshot application decided.
#[derive(Debug, Default)]
pub(crate) struct Evaluation {
    /// Activation pulse to publish, if an edge was detected.
    pub activation: Option<Activation>,
    /// Cooldown-approved alert to publish, if any.
    pub alert: Option<Alert>,
    /// Additional work for the current cycle.
    pub follow_up: Option<FollowUp>,
}

/// Applies a freshly fetched snapshot to the state and decides reactions.
pub(crate) fn apply_snapshot(
    state: &mut ManagerState,
    snapshot: Snapshot,
    now: DateTime<Utc>,
    cfg: &ManagerConfig,
) -> Evaluation {
    let previous = state.status();
    let mut evaluation = Evaluation::default();

    if snapshot.status == Status::Active && previous != Status::Active {
        evaluation.activation = Some(Activation::new(now));
    }

    // A fresh non-lapsed status starts a new episode; the next expiration may
    // alert again.
    if !snapshot.status.is_lapsed() {
        state.auto_cancel_alerted = false;
    }

    let candidate = alert_candidate(&snapshot, now, cfg, &mut evaluation.follow_up);
    state.current = Some(snapshot);

    if let Some(kind) = candidate {
        evaluation.alert = gate_alert(state, kind, now, cfg.alert_cooldown);
    }

    evaluation
}

/// Applies the result of the grace-period recheck fetch.
///
/// Only invoked after `apply_snapshot` requested [`FollowUp::CancelRecheck`].
pub(crate) fn apply_recheck(
    state: &mut ManagerState,
    snapshot: Snapshot,
    now: DateTime<Utc>,
    cfg: &ManagerConfig,
) -> Evaluation {
    if snapshot.status != Status::Canceled {
        // Anything else (renewed, still expired, ...) goes through the regular
        // rules; one recheck per cycle, so drop any new follow-up.
        let mut evaluation = apply_snapshot(state, snapshot, now, cfg);
        evaluation.follow_up = None;
        return evaluation;
    }

    state.current = Some(snapshot);
    if state.auto_cancel_alerted {
        return Evaluation::default();
    }

    // First auto-cancel notice of this episode: the global cooldown does not
    // suppress it, but it still counts as the last alert.
    state.auto_cancel_alerted = true;
    let alert = Alert::new(AlertKind::AutoCanceled, now);
    state.pending_alert = Some(alert.clone());
    state.last_alert_at = Some(now);

    Evaluation {
        alert: Some(alert),
        ..Evaluation::default()
    }
}

/// Decides whether the snapshot warrants an alert, before the cooldown gate.
fn alert_candidate(
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    cfg: &ManagerConfig,
    follow_up: &mut Option<FollowUp>,
) -> Option<AlertKind> {
    match snapshot.status {
        Status::Active | Status::ExpiresSoon => {
            let eligible = snapshot.status == Status::ExpiresSoon
                || snapshot.will_expire_soon(now, cfg.soon_threshold_days);
            if !eligible {
                return None;
            }
            match snapshot.days_until_expiration(now) {
                Some(days) => Some(AlertKind::ExpiresSoon {
                    days_left: days.max(0),
                }),
                None => {
                    debug!("period end unknown; skipping expires-soon alert");
                    None
                }
            }
        }
        Status::Expired => {
            // An absent period end reads as "just expired": the status is
            // authoritative, and malformed timestamps never get this far
            // (decoding them fails the whole fetch).
            let days = snapshot.days_since_expiration(now).unwrap_or(0);
            if days >= cfg.grace_period_days {
                *follow_up = Some(FollowUp::CancelRecheck);
                None
            } else {
                Some(AlertKind::GraceRemaining {
                    days_left: cfg.grace_period_days - days,
                })
            }
        }
        Status::None | Status::Pending | Status::Canceled => None,
    }
}

/// Global cooldown gate: at most one alert per window, regardless of kind.
///
/// State is already updated by the caller; only the emission is suppressed.
fn gate_alert(
    state: &mut ManagerState,
    kind: AlertKind,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> Option<Alert> {
    if let Some(last) = state.last_alert_at {
        // A negative elapsed (clock skew) also counts as within the window.
        let within = now
            .signed_duration_since(last)
            .to_std()
            .map(|elapsed| elapsed < cooldown)
            .unwrap_or(true);
        if within {
            debug!(?kind, "alert suppressed by cooldown");
            return None;
        }
    }

    let alert = Alert::new(kind, now);
    state.pending_alert = Some(alert.clone());
    state.last_alert_at = Some(now);
    Some(alert)
}
