//! User-visible events and their broadcast channels.
//!
//! The manager pushes two kinds of events to consumers:
//! - [`Alert`] — throttled expiration / grace-period / auto-cancel warnings
//! - [`Activation`] — one-shot pulse on each detected activation edge
//!
//! Each kind gets its own [`Bus`], a thin wrapper over
//! [`tokio::sync::broadcast`]. Delivery follows loop order; subscribers that
//! attach mid-stream only see events published after they attached.

mod activation;
mod alert;
mod bus;

pub use activation::Activation;
pub use alert::{Alert, AlertKind};
pub use bus::Bus;
