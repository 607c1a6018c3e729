//! # Lifecycle manager: polling loop, evaluation rules, and read surface.
//!
//! ## High-level architecture
//! ```text
//! Consumers (UI, services):
//!   start() / stop() / clear()          control
//!   check_now() / refresh_now()         on-demand cycle (e.g. foreground return)
//!   current() / pending_alert()         pull
//!   alert_stream() / activation_stream()  push (broadcast, no replay)
//!
//!                 ┌──────────────────────────────────────────────┐
//!                 │ LifecycleManager                             │
//!                 │  - ManagerState (exclusively owned)          │
//!                 │  - Bus<Alert> / Bus<Activation>              │
//!                 │  - PollHandle { token, command tx, join }    │
//!                 └──────────────┬───────────────────────────────┘
//!                                │ spawn on start()
//!                                ▼
//!                 ┌──────────────────────────────────────────────┐
//!                 │ Poller (single background actor)             │
//!                 │  loop {                                      │
//!                 │    select! {                                 │
//!                 │      cancelled        → break                │
//!                 │      sleep_until(tick)→ cycle()              │
//!                 │      command          → cycle() (+reply)     │
//!                 │    }                                         │
//!                 │  }                                           │
//!                 │  cycle(): token? → fetch (bounded) →         │
//!                 │           rules::apply_snapshot →            │
//!                 │           publish pulses/alerts →            │
//!                 │           optional grace recheck fetch       │
//!                 └──────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - One background actor per manager; commands and timer ticks are handled
//!   by the same task, so all state writes are serialized.
//! - Consumers only ever receive snapshot clones and event copies, never
//!   references into the manager's internals.
//! - `stop()` cancels the in-flight wait; a fetch that completes after
//!   cancellation is discarded, never applied.

mod core;
mod poller;
mod rules;
mod state;

pub use self::core::LifecycleManager;
pub use poller::CycleOutcome;
