//! Public facade: lifecycle control, pull reads, and event subscriptions.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::{
    sync::{broadcast, mpsc, oneshot},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::{
    config::ManagerConfig,
    error::ManagerError,
    events::{Activation, Alert, Bus},
    manager::{
        poller::{Command, CycleOutcome, Poller},
        state::ManagerState,
    },
    snapshot::Snapshot,
    sources::{AuthTokenSource, SubscriptionSource},
};

/// Capacity of the command queue between the facade and the poller task.
///
/// Small on purpose: a full queue means a manual check is already pending, so
/// further `check_now` requests coalesce into it.
const COMMAND_QUEUE: usize = 4;

/// Handle to a running polling loop.
struct PollHandle {
    cancel: CancellationToken,
    commands: mpsc::Sender<Command>,
    join: JoinHandle<()>,
}

/// Supervises one user's subscription lifecycle.
///
/// Explicitly constructed and injected — there is no global instance. The
/// session/auth component owns it: `start()` after sign-in, `clear()` on
/// sign-out. Any number of consumers may read [`current`](Self::current) or
/// subscribe to the event streams.
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use subvisor::{
///     AuthToken, AuthTokenSource, FetchError, LifecycleManager, ManagerConfig,
///     Snapshot, Status, SubscriptionSource,
/// };
///
/// struct AlwaysActive;
///
/// #[async_trait]
/// impl SubscriptionSource for AlwaysActive {
///     async fn fetch(&self, _credential: &AuthToken) -> Result<Snapshot, FetchError> {
///         Ok(Snapshot::with_status(Status::Active))
///     }
/// }
///
/// struct SignedIn;
///
/// impl AuthTokenSource for SignedIn {
///     fn current(&self) -> Option<AuthToken> {
///         Some(AuthToken::new("bearer"))
///     }
/// }
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let manager = LifecycleManager::new(
///         ManagerConfig::default(),
///         Arc::new(AlwaysActive),
///         Arc::new(SignedIn),
///     );
///
///     let mut pulses = manager.activation_stream();
///     manager.start();
///     manager.refresh_now().await?;
///
///     // NONE → ACTIVE is an activation edge.
///     let pulse = pulses.recv().await?;
///     assert!(pulse.at <= chrono::Utc::now());
///
///     manager.stop().await;
///     Ok(())
/// }
/// ```
pub struct LifecycleManager {
    cfg: ManagerConfig,
    source: Arc<dyn SubscriptionSource>,
    auth: Arc<dyn AuthTokenSource>,
    state: Arc<Mutex<ManagerState>>,
    alerts: Bus<Alert>,
    activations: Bus<Activation>,
    runtime: Mutex<Option<PollHandle>>,
}

impl LifecycleManager {
    /// Creates a manager with the given collaborators. Polling does not begin
    /// until [`start`](Self::start).
    pub fn new(
        cfg: ManagerConfig,
        source: Arc<dyn SubscriptionSource>,
        auth: Arc<dyn AuthTokenSource>,
    ) -> Self {
        let capacity = cfg.bus_capacity_clamped();
        Self {
            cfg,
            source,
            auth,
            state: Arc::new(Mutex::new(ManagerState::default())),
            alerts: Bus::new(capacity),
            activations: Bus::new(capacity),
            runtime: Mutex::new(None),
        }
    }

    /// Starts the background polling loop. Idempotent: calling while already
    /// running is a no-op, never a second concurrent loop.
    ///
    /// The first cycle runs immediately after spawn.
    pub fn start(&self) {
        let mut runtime = self.runtime.lock();
        if let Some(handle) = runtime.as_ref() {
            if !handle.join.is_finished() {
                debug!("start() ignored; polling loop already running");
                return;
            }
        }

        let cancel = CancellationToken::new();
        let (commands, command_rx) = mpsc::channel(COMMAND_QUEUE);
        let poller = Poller::new(
            self.cfg.clone(),
            Arc::clone(&self.source),
            Arc::clone(&self.auth),
            Arc::clone(&self.state),
            self.alerts.clone(),
            self.activations.clone(),
            command_rx,
        );
        let join = tokio::spawn(poller.run(cancel.clone()));
        *runtime = Some(PollHandle {
            cancel,
            commands,
            join,
        });
        debug!("polling loop started");
    }

    /// Stops the polling loop and waits for it to exit. Safe to call when not
    /// running. An in-flight fetch may still complete on the source side, but
    /// its result is discarded rather than applied.
    pub async fn stop(&self) {
        let handle = self.runtime.lock().take();
        if let Some(handle) = handle {
            handle.cancel.cancel();
            if let Err(err) = handle.join.await {
                error!(?err, "polling loop terminated abnormally");
            }
            debug!("polling loop stopped");
        }
    }

    /// Tears down everything on sign-out: stops polling and wipes all state.
    ///
    /// Afterwards [`current`](Self::current) reports no subscription and no
    /// alerts fire until [`start`](Self::start) is called again.
    pub async fn clear(&self) {
        self.stop().await;
        *self.state.lock() = ManagerState::default();
        debug!("manager state cleared");
    }

    /// Queues one immediate fetch-and-evaluate cycle (e.g. on return to
    /// foreground) without waiting for its result.
    ///
    /// Coalesces: if a manual check is already queued, this is a no-op.
    pub fn check_now(&self) -> Result<(), ManagerError> {
        let runtime = self.runtime.lock();
        let Some(handle) = runtime.as_ref().filter(|h| !h.join.is_finished()) else {
            error!("check_now() called while manager is not running");
            return Err(ManagerError::NotRunning);
        };
        match handle.commands.try_send(Command::Check) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!("check_now() coalesced into already-queued cycle");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!("check_now() raced with a stopping loop");
                Err(ManagerError::Stopped)
            }
        }
    }

    /// Runs one cycle immediately and returns once it completed, reporting how
    /// it went — lets a consumer tie a spinner to an explicit refresh.
    pub async fn refresh_now(&self) -> Result<CycleOutcome, ManagerError> {
        let commands = {
            let runtime = self.runtime.lock();
            match runtime.as_ref().filter(|h| !h.join.is_finished()) {
                Some(handle) => handle.commands.clone(),
                None => {
                    error!("refresh_now() called while manager is not running");
                    return Err(ManagerError::NotRunning);
                }
            }
        };

        let (reply, outcome) = oneshot::channel();
        if commands.send(Command::Refresh(reply)).await.is_err() {
            warn!("refresh_now() raced with a stopping loop");
            return Err(ManagerError::Stopped);
        }
        outcome.await.map_err(|_| ManagerError::Stopped)
    }

    /// Latest known snapshot, or `None` when never fetched / cleared.
    pub fn current(&self) -> Option<Snapshot> {
        self.state.lock().current.clone()
    }

    /// Most recent alert not yet acknowledged, if any.
    pub fn pending_alert(&self) -> Option<Alert> {
        self.state.lock().pending_alert.clone()
    }

    /// Marks the pending alert as shown to the user.
    ///
    /// Does not affect the cooldown bookkeeping.
    pub fn acknowledge_alert(&self) {
        self.state.lock().pending_alert = None;
    }

    /// Subscribes to cooldown-approved alerts. No replay: only alerts decided
    /// after this call are delivered.
    pub fn alert_stream(&self) -> broadcast::Receiver<Alert> {
        self.alerts.subscribe()
    }

    /// Subscribes to activation pulses. No replay.
    pub fn activation_stream(&self) -> broadcast::Receiver<Activation> {
        self.activations.subscribe()
    }

    /// True while the polling loop is running.
    pub fn is_running(&self) -> bool {
        self.runtime
            .lock()
            .as_ref()
            .map(|h| !h.join.is_finished())
            .unwrap_or(false)
    }
}
