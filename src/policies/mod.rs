//! Retry spacing for consecutive fetch failures.
//!
//! When the subscription source keeps failing, the polling loop stops waiting
//! the full poll interval and instead retries on a bounded, growing delay.
//!
//! ## Contents
//! - [`BackoffPolicy`] how retry delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`] randomization strategy to avoid synchronized retries
//!
//! ## Quick wiring
//! ```text
//! ManagerConfig { failure_backoff: BackoffPolicy, poll_interval, ... }
//!      └─► manager::poller uses:
//!           - backoff.next(consecutive_failures) after a failed cycle
//!           - poll_interval after a successful or skipped cycle
//! ```
//!
//! The poller additionally caps each retry delay at the poll interval: a
//! persistently failing network may retry sooner than the regular cadence,
//! never later.

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
