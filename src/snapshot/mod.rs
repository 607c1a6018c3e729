//! Subscription snapshot: the server's view of a subscription at one point in time.
//!
//! ## Contents
//! - [`Status`] — enumerated lifecycle states as reported by the billing backend
//! - [`Snapshot`] — immutable fetch result with derived expiration accessors
//!
//! The manager never mutates a snapshot in place; state progression means
//! replacing the currently held snapshot with a freshly fetched one.

mod status;

#[allow(clippy::module_inception)]
mod snapshot;

pub use snapshot::Snapshot;
pub use status::Status;
