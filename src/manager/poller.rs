//! Single background actor driving fetch-and-evaluate cycles.
//!
//! One poller task exists per running manager. Timer ticks and consumer
//! commands (`check_now` / `refresh_now`) are handled by the same task, so
//! every write to [`ManagerState`] is serialized by construction — a
//! foreground-triggered cycle can never interleave with a timer-triggered one.
//!
//! ## Cycle
//! 1. Read the credential; absent → skip silently (signed out is normal).
//! 2. Fetch a snapshot, bounded by the configured timeout, cancellable.
//! 3. Apply `rules::apply_snapshot`, publish the decided pulse/alert.
//! 4. If the grace period elapsed, re-fetch once and apply `rules::apply_recheck`.
//!
//! Failed cycles leave state untouched; consecutive failures shorten the wait
//! to the backoff delay (capped at the poll interval) until a cycle succeeds.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::{
    sync::{mpsc, oneshot},
    time::{self, Instant},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::{
    config::ManagerConfig,
    error::FetchError,
    events::{Activation, Alert, Bus},
    manager::{
        rules::{self, Evaluation, FollowUp},
        state::ManagerState,
    },
    snapshot::Snapshot,
    sources::{AuthToken, AuthTokenSource, SubscriptionSource},
};

/// Requests posted to the poller task by the manager facade.
pub(crate) enum Command {
    /// Run one cycle as soon as possible; no reply.
    Check,
    /// Run one cycle and report how it went.
    Refresh(oneshot::Sender<CycleOutcome>),
}

/// How one fetch-and-evaluate cycle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A snapshot was fetched and applied.
    Applied,
    /// No credential available; the cycle was skipped silently.
    SignedOut,
    /// The fetch failed; state unchanged, next cycle retries.
    FetchFailed,
    /// The manager was stopped mid-cycle; any result was discarded.
    Cancelled,
}

/// Result of one bounded, cancellable fetch attempt.
enum FetchAttempt {
    Ok(Snapshot),
    Err(FetchError),
    Cancelled,
}

pub(crate) struct Poller {
    cfg: ManagerConfig,
    source: Arc<dyn SubscriptionSource>,
    auth: Arc<dyn AuthTokenSource>,
    state: Arc<Mutex<ManagerState>>,
    alerts: Bus<Alert>,
    activations: Bus<Activation>,
    commands: mpsc::Receiver<Command>,
}

impl Poller {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        cfg: ManagerConfig,
        source: Arc<dyn SubscriptionSource>,
        auth: Arc<dyn AuthTokenSource>,
        state: Arc<Mutex<ManagerState>>,
        alerts: Bus<Alert>,
        activations: Bus<Activation>,
        commands: mpsc::Receiver<Command>,
    ) -> Self {
        Self {
            cfg,
            source,
            auth,
            state,
            alerts,
            activations,
            commands,
        }
    }

    /// Runs the loop until cancellation or until the manager facade is dropped.
    ///
    /// The first cycle runs immediately; afterwards the next tick is scheduled
    /// from the end of each cycle (regular interval on success, capped backoff
    /// after failures). Commands interrupt the wait, run a cycle, and reset
    /// the schedule.
    pub(crate) async fn run(mut self, cancel: CancellationToken) {
        let mut failures: u32 = 0;
        let mut next_tick = Instant::now();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,

                _ = time::sleep_until(next_tick) => {
                    let outcome = self.cycle(&cancel).await;
                    if outcome == CycleOutcome::Cancelled {
                        break;
                    }
                    failures = Self::tally(failures, outcome);
                    next_tick = Instant::now() + self.cfg.next_delay(failures);
                }

                cmd = self.commands.recv() => match cmd {
                    Some(cmd) => {
                        let outcome = self.cycle(&cancel).await;
                        if let Command::Refresh(reply) = cmd {
                            let _ = reply.send(outcome);
                        }
                        if outcome == CycleOutcome::Cancelled {
                            break;
                        }
                        failures = Self::tally(failures, outcome);
                        next_tick = Instant::now() + self.cfg.next_delay(failures);
                    }
                    // Manager dropped without a stop(): shut the loop down.
                    None => break,
                },
            }
        }
        debug!("polling loop exited");
    }

    fn tally(failures: u32, outcome: CycleOutcome) -> u32 {
        match outcome {
            CycleOutcome::FetchFailed => failures.saturating_add(1),
            _ => 0,
        }
    }

    /// One fetch-and-evaluate cycle.
    async fn cycle(&self, cancel: &CancellationToken) -> CycleOutcome {
        let Some(credential) = self.auth.current() else {
            trace!("signed out; skipping cycle");
            return CycleOutcome::SignedOut;
        };

        let snapshot = match self.fetch(&credential, cancel).await {
            FetchAttempt::Ok(snapshot) => snapshot,
            FetchAttempt::Err(err) => {
                warn!(label = err.as_label(), error = %err, "fetch failed; state unchanged");
                return CycleOutcome::FetchFailed;
            }
            FetchAttempt::Cancelled => return CycleOutcome::Cancelled,
        };

        let now = Utc::now();
        let evaluation = {
            let mut state = self.state.lock();
            rules::apply_snapshot(&mut state, snapshot, now, &self.cfg)
        };
        let follow_up = evaluation.follow_up;
        self.publish(evaluation);

        if follow_up == Some(FollowUp::CancelRecheck) {
            match self.fetch(&credential, cancel).await {
                FetchAttempt::Ok(snapshot) => {
                    let now = Utc::now();
                    let evaluation = {
                        let mut state = self.state.lock();
                        rules::apply_recheck(&mut state, snapshot, now, &self.cfg)
                    };
                    self.publish(evaluation);
                }
                FetchAttempt::Err(err) => {
                    // Transient like any other fetch error: the next cycle
                    // re-evaluates the grace period from scratch.
                    warn!(label = err.as_label(), error = %err, "grace recheck failed");
                }
                FetchAttempt::Cancelled => return CycleOutcome::Cancelled,
            }
        }

        CycleOutcome::Applied
    }

    fn publish(&self, evaluation: Evaluation) {
        if let Some(pulse) = evaluation.activation {
            debug!(at = %pulse.at, "activation edge detected");
            self.activations.publish(pulse);
        }
        if let Some(alert) = evaluation.alert {
            debug!(kind = ?alert.kind, "alert emitted");
            self.alerts.publish(alert);
        }
    }

    /// Fetches one snapshot, bounded by the configured timeout.
    ///
    /// Cancellation wins over a slow fetch; a result arriving after the token
    /// fired is dropped here and never reaches the state.
    async fn fetch(&self, credential: &AuthToken, cancel: &CancellationToken) -> FetchAttempt {
        let bounded = async {
            match self.cfg.fetch_timeout_opt() {
                Some(limit) => match time::timeout(limit, self.source.fetch(credential)).await {
                    Ok(result) => result,
                    Err(_elapsed) => Err(FetchError::Timeout { timeout: limit }),
                },
                None => self.source.fetch(credential).await,
            }
        };

        tokio::select! {
            result = bounded => match result {
                Ok(snapshot) => FetchAttempt::Ok(snapshot),
                Err(err) => FetchAttempt::Err(err),
            },
            _ = cancel.cancelled() => FetchAttempt::Cancelled,
        }
    }
}
