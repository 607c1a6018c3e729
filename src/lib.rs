//! # subvisor
//!
//! **Subvisor** supervises a professional's billing subscription on behalf of
//! a client application: it polls the backend's view of the subscription,
//! observes lifecycle transitions, throttles user-facing expiration warnings,
//! and reasons about the grace period before a lapsed subscription is treated
//! as auto-cancelled.
//!
//! ## Architecture
//! ```text
//!     ┌────────────────┐       ┌────────────────┐
//!     │ AuthTokenSource│       │SubscriptionSrc │   (app-provided traits)
//!     └───────┬────────┘       └───────┬────────┘
//!             │ current()              │ fetch(token) → Snapshot | FetchError
//!             ▼                        ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │ LifecycleManager                                          │
//! │  - ManagerState (current snapshot, cooldown bookkeeping)  │
//! │  - Poller: one cancellable background task                │
//! │      tick / check_now / refresh_now → fetch + evaluate    │
//! │  - rules: activation edge, cooldown gate, grace period    │
//! └──────┬──────────────────────┬─────────────────────────────┘
//!        │ Bus<Alert>           │ Bus<Activation>
//!        ▼                      ▼
//!   alert_stream()        activation_stream()      (broadcast, no replay)
//!        │                      │
//!        ▼                      ▼
//!   banner / dialog UI    discoverability refresh, role-gated screens
//! ```
//!
//! ## Lifecycle
//! ```text
//! sign-in  ──► LifecycleManager::new(cfg, source, auth) ──► start()
//!                    │
//!                    ├─ loop: fetch → apply rules → publish events
//!                    ├─ check_now()/refresh_now(): same task, same rules
//!                    └─ consecutive fetch failures → capped backoff
//!
//! sign-out ──► clear()  (stops the loop, wipes all state)
//! ```
//!
//! ## Guarantees
//! - **Single writer**: timer ticks and on-demand refreshes are serialized on
//!   one actor task; state can never be half-updated by a race.
//! - **One pulse per activation edge**: `Active` observed after any other
//!   status emits exactly one [`Activation`]; re-observing `Active` does not.
//! - **Throttled alerts**: at most one [`Alert`] per cooldown window, global
//!   across alert kinds (the first auto-cancel notice of an expiration
//!   episode is exempt, and never repeats within the episode).
//! - **Transparent failures**: fetch errors skip the cycle and retry later;
//!   the user only ever notices by the absence of an alert.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use subvisor::{
//!     AuthToken, AuthTokenSource, FetchError, LifecycleManager, ManagerConfig,
//!     Snapshot, Status, SubscriptionSource,
//! };
//!
//! struct BillingApi;
//!
//! #[async_trait]
//! impl SubscriptionSource for BillingApi {
//!     async fn fetch(&self, _credential: &AuthToken) -> Result<Snapshot, FetchError> {
//!         // Real implementations call the billing endpoint here.
//!         Ok(Snapshot::with_status(Status::Active))
//!     }
//! }
//!
//! struct Session;
//!
//! impl AuthTokenSource for Session {
//!     fn current(&self) -> Option<AuthToken> {
//!         Some(AuthToken::new("bearer"))
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager =
//!         LifecycleManager::new(ManagerConfig::default(), Arc::new(BillingApi), Arc::new(Session));
//!
//!     let mut activations = manager.activation_stream();
//!     manager.start();
//!
//!     // Explicit, spinner-friendly refresh.
//!     let outcome = manager.refresh_now().await?;
//!     println!("refresh: {outcome:?}");
//!
//!     let _pulse = activations.recv().await?;
//!     assert_eq!(manager.current().map(|s| s.status), Some(Status::Active));
//!
//!     manager.clear().await; // sign-out
//!     assert!(manager.current().is_none());
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod events;
mod manager;
mod policies;
mod snapshot;
mod sources;

// ---- Public re-exports ----

pub use config::ManagerConfig;
pub use error::{FetchError, ManagerError};
pub use events::{Activation, Alert, AlertKind, Bus};
pub use manager::{CycleOutcome, LifecycleManager};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use snapshot::{Snapshot, Status};
pub use sources::{AuthToken, AuthTokenSource, SubscriptionSource};
