//! End-to-end tests for the lifecycle manager: polling cadence, on-demand
//! refreshes, alert throttling, grace-period rechecks, and teardown.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use parking_lot::Mutex;
use tokio::time::{advance, sleep};

use subvisor::{
    AlertKind, AuthToken, AuthTokenSource, CycleOutcome, FetchError, JitterPolicy,
    LifecycleManager, ManagerConfig, ManagerError, Snapshot, Status, SubscriptionSource,
};

/// Returns each scripted response once, then errors ("script exhausted").
struct ScriptedSource {
    script: Mutex<VecDeque<Result<Snapshot, FetchError>>>,
    calls: AtomicU32,
}

impl ScriptedSource {
    fn new(script: Vec<Result<Snapshot, FetchError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: AtomicU32::new(0),
        })
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubscriptionSource for ScriptedSource {
    async fn fetch(&self, _credential: &AuthToken) -> Result<Snapshot, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script.lock().pop_front().unwrap_or_else(|| {
            Err(FetchError::Network {
                message: "script exhausted".into(),
            })
        })
    }
}

/// Always returns the same snapshot; counts fetches.
struct RepeatSource {
    snapshot: Snapshot,
    calls: AtomicU32,
}

impl RepeatSource {
    fn new(snapshot: Snapshot) -> Arc<Self> {
        Arc::new(Self {
            snapshot,
            calls: AtomicU32::new(0),
        })
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubscriptionSource for RepeatSource {
    async fn fetch(&self, _credential: &AuthToken) -> Result<Snapshot, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshot.clone())
    }
}

/// A fetch that never completes; used to exercise cancellation of in-flight work.
struct HangingSource;

#[async_trait]
impl SubscriptionSource for HangingSource {
    async fn fetch(&self, _credential: &AuthToken) -> Result<Snapshot, FetchError> {
        std::future::pending().await
    }
}

/// Toggleable session credential.
struct Session {
    token: Mutex<Option<AuthToken>>,
}

impl Session {
    fn signed_in() -> Arc<Self> {
        Arc::new(Self {
            token: Mutex::new(Some(AuthToken::new("bearer"))),
        })
    }

    fn signed_out() -> Arc<Self> {
        Arc::new(Self {
            token: Mutex::new(None),
        })
    }

    fn sign_in(&self) {
        *self.token.lock() = Some(AuthToken::new("bearer"));
    }
}

impl AuthTokenSource for Session {
    fn current(&self) -> Option<AuthToken> {
        self.token.lock().clone()
    }
}

fn test_config() -> ManagerConfig {
    // Surface the manager's warn!/debug! output when a test fails.
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let mut cfg = ManagerConfig::default();
    cfg.failure_backoff.jitter = JitterPolicy::None;
    cfg
}

fn active_ending_in(days: i64) -> Snapshot {
    Snapshot {
        role: Some("sitter".into()),
        // Half-day margin so whole-day truncation is stable while the test runs.
        current_period_end: Some(Utc::now() + TimeDelta::days(days) + TimeDelta::hours(12)),
        ..Snapshot::with_status(Status::Active)
    }
}

fn expired_since(days: i64) -> Snapshot {
    Snapshot {
        current_period_end: Some(Utc::now() - TimeDelta::days(days) - TimeDelta::hours(12)),
        ..Snapshot::with_status(Status::Expired)
    }
}

/// Lets the freshly spawned poller run its immediate first cycle.
async fn settle() {
    sleep(Duration::from_millis(10)).await;
}

#[tokio::test(start_paused = true)]
async fn refresh_applies_snapshot() {
    let source = RepeatSource::new(active_ending_in(30));
    let manager = LifecycleManager::new(test_config(), source, Session::signed_in());

    manager.start();
    let outcome = manager.refresh_now().await.unwrap();
    assert_eq!(outcome, CycleOutcome::Applied);
    assert_eq!(manager.current().map(|s| s.status), Some(Status::Active));

    manager.stop().await;
}

#[tokio::test(start_paused = true)]
async fn signed_out_cycles_are_skipped_silently() {
    let source = RepeatSource::new(active_ending_in(30));
    let manager = LifecycleManager::new(test_config(), source.clone(), Session::signed_out());

    manager.start();
    settle().await;
    let outcome = manager.refresh_now().await.unwrap();

    assert_eq!(outcome, CycleOutcome::SignedOut);
    assert_eq!(source.calls(), 0);
    assert!(manager.current().is_none());

    manager.stop().await;
}

#[tokio::test(start_paused = true)]
async fn fetch_failure_leaves_state_unchanged() {
    let session = Session::signed_out();
    let source = ScriptedSource::new(vec![
        Ok(active_ending_in(30)),
        Err(FetchError::Network {
            message: "offline".into(),
        }),
    ]);
    let manager = LifecycleManager::new(test_config(), source, session.clone());

    manager.start();
    settle().await; // initial cycle skips: signed out
    session.sign_in();

    assert_eq!(manager.refresh_now().await.unwrap(), CycleOutcome::Applied);
    let before = manager.current();
    assert!(before.is_some());

    assert_eq!(
        manager.refresh_now().await.unwrap(),
        CycleOutcome::FetchFailed
    );
    assert_eq!(manager.current(), before);

    manager.stop().await;
}

#[tokio::test(start_paused = true)]
async fn activation_pulses_once_across_sequence() {
    let session = Session::signed_out();
    let source = ScriptedSource::new(vec![
        Ok(Snapshot::with_status(Status::None)),
        Ok(Snapshot::with_status(Status::Pending)),
        Ok(active_ending_in(30)),
        Ok(active_ending_in(30)),
    ]);
    let manager = LifecycleManager::new(test_config(), source, session.clone());
    let mut pulses = manager.activation_stream();

    manager.start();
    settle().await;
    session.sign_in();

    for _ in 0..3 {
        assert_eq!(manager.refresh_now().await.unwrap(), CycleOutcome::Applied);
    }
    // Exactly one pulse, after the third fetch.
    assert!(pulses.try_recv().is_ok());
    assert!(pulses.try_recv().is_err());

    // Re-observing ACTIVE does not pulse again.
    assert_eq!(manager.refresh_now().await.unwrap(), CycleOutcome::Applied);
    assert!(pulses.try_recv().is_err());

    manager.stop().await;
}

#[tokio::test(start_paused = true)]
async fn cooldown_yields_single_alert_within_window() {
    let session = Session::signed_out();
    let source = RepeatSource::new(active_ending_in(5));
    let manager = LifecycleManager::new(test_config(), source, session.clone());
    let mut alerts = manager.alert_stream();

    manager.start();
    settle().await;
    session.sign_in();

    manager.refresh_now().await.unwrap();
    manager.refresh_now().await.unwrap();

    let first = alerts.try_recv().unwrap();
    assert_eq!(first.kind, AlertKind::ExpiresSoon { days_left: 5 });
    assert!(alerts.try_recv().is_err(), "second alert inside cooldown");

    // Pending alert stays readable until acknowledged.
    assert_eq!(manager.pending_alert().map(|a| a.kind), Some(first.kind));
    manager.acknowledge_alert();
    assert!(manager.pending_alert().is_none());

    manager.stop().await;
}

#[tokio::test(start_paused = true)]
async fn grace_recheck_emits_auto_cancel_alert_once() {
    let session = Session::signed_out();
    let source = ScriptedSource::new(vec![
        Ok(expired_since(4)),
        Ok(Snapshot::with_status(Status::Canceled)), // recheck
        Ok(Snapshot::with_status(Status::Canceled)), // next regular cycle
    ]);
    let manager = LifecycleManager::new(test_config(), source.clone(), session.clone());
    let mut alerts = manager.alert_stream();

    manager.start();
    settle().await;
    session.sign_in();

    assert_eq!(manager.refresh_now().await.unwrap(), CycleOutcome::Applied);
    // One cycle, two fetches: the snapshot and the grace recheck.
    assert_eq!(source.calls(), 2);
    assert_eq!(
        alerts.try_recv().map(|a| a.kind),
        Ok(AlertKind::AutoCanceled)
    );
    assert_eq!(manager.current().map(|s| s.status), Some(Status::Canceled));

    // Still CANCELED on the next cycle: no repeat alert.
    assert_eq!(manager.refresh_now().await.unwrap(), CycleOutcome::Applied);
    assert!(alerts.try_recv().is_err());

    manager.stop().await;
}

#[tokio::test(start_paused = true)]
async fn failed_grace_recheck_is_transient() {
    let session = Session::signed_out();
    let source = ScriptedSource::new(vec![
        Ok(expired_since(4)),
        Err(FetchError::Network {
            message: "offline".into(),
        }), // recheck fails
    ]);
    let manager = LifecycleManager::new(test_config(), source.clone(), session.clone());
    let mut alerts = manager.alert_stream();

    manager.start();
    settle().await;
    session.sign_in();

    // The cycle itself still counts as applied; no alert was decided.
    assert_eq!(manager.refresh_now().await.unwrap(), CycleOutcome::Applied);
    assert_eq!(source.calls(), 2);
    assert!(alerts.try_recv().is_err());
    assert_eq!(manager.current().map(|s| s.status), Some(Status::Expired));

    manager.stop().await;
}

#[tokio::test(start_paused = true)]
async fn polling_follows_interval_and_survives_restart() {
    let source = RepeatSource::new(active_ending_in(30));
    let cfg = test_config();
    let interval = cfg.poll_interval;
    let manager = LifecycleManager::new(cfg, source.clone(), Session::signed_in());

    manager.start();
    settle().await;
    assert_eq!(source.calls(), 1, "immediate first cycle");

    advance(interval).await;
    settle().await;
    assert_eq!(source.calls(), 2, "one tick per interval");

    manager.stop().await;
    advance(interval).await;
    settle().await;
    assert_eq!(source.calls(), 2, "no ticks while stopped");

    manager.start();
    settle().await;
    assert_eq!(source.calls(), 3, "restart runs an immediate cycle");

    advance(interval).await;
    settle().await;
    assert_eq!(source.calls(), 4, "exactly one loop after restart");

    manager.stop().await;
}

#[tokio::test(start_paused = true)]
async fn start_is_idempotent() {
    let source = RepeatSource::new(active_ending_in(30));
    let manager = LifecycleManager::new(test_config(), source.clone(), Session::signed_in());

    manager.start();
    manager.start();
    settle().await;
    assert_eq!(source.calls(), 1, "second start must not spawn a second loop");
    assert!(manager.is_running());

    manager.stop().await;
    assert!(!manager.is_running());
}

#[tokio::test(start_paused = true)]
async fn consecutive_failures_retry_with_backoff() {
    let source = ScriptedSource::new(vec![]); // every fetch errors
    let mut cfg = test_config();
    cfg.failure_backoff.first = Duration::from_secs(30);
    cfg.failure_backoff.factor = 2.0;
    let manager = LifecycleManager::new(cfg, source.clone(), Session::signed_in());

    manager.start();
    settle().await;
    assert_eq!(source.calls(), 1);

    // First retry after 30s, not after the full 30min interval.
    advance(Duration::from_secs(30)).await;
    settle().await;
    assert_eq!(source.calls(), 2);

    // Second retry doubles to 60s.
    advance(Duration::from_secs(30)).await;
    settle().await;
    assert_eq!(source.calls(), 2);
    advance(Duration::from_secs(30)).await;
    settle().await;
    assert_eq!(source.calls(), 3);

    manager.stop().await;
}

#[tokio::test]
async fn stop_discards_in_flight_fetch() {
    let manager = LifecycleManager::new(
        test_config(),
        Arc::new(HangingSource),
        Session::signed_in(),
    );

    manager.start();
    // Give the hanging fetch a moment to start.
    sleep(Duration::from_millis(20)).await;
    manager.stop().await;

    assert!(manager.current().is_none(), "cancelled fetch must not apply");
    assert!(!manager.is_running());
}

#[tokio::test(start_paused = true)]
async fn clear_wipes_state_and_forbids_refresh() {
    let source = RepeatSource::new(active_ending_in(5));
    let manager = LifecycleManager::new(test_config(), source, Session::signed_in());

    manager.start();
    manager.refresh_now().await.unwrap();
    assert!(manager.current().is_some());
    assert!(manager.pending_alert().is_some());

    manager.clear().await;
    assert!(manager.current().is_none());
    assert!(manager.pending_alert().is_none());
    assert_eq!(manager.refresh_now().await, Err(ManagerError::NotRunning));
    assert_eq!(manager.check_now(), Err(ManagerError::NotRunning));
}

#[tokio::test(start_paused = true)]
async fn check_now_runs_a_cycle_without_blocking() {
    let source = RepeatSource::new(active_ending_in(30));
    let manager = LifecycleManager::new(test_config(), source.clone(), Session::signed_in());

    manager.start();
    settle().await;
    assert_eq!(source.calls(), 1);

    manager.check_now().unwrap();
    settle().await;
    assert_eq!(source.calls(), 2);

    manager.stop().await;
}
