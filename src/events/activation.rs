//! Activation pulse: "the subscription just became active".
//!
//! Emitted exactly once per activation edge (previous observed status was not
//! `Active`, the new one is). Carries no payload beyond the decision time;
//! consumers react by refreshing whatever they display (e.g. a
//! discoverability list), not by inspecting the pulse.

use chrono::{DateTime, Utc};

/// One-shot pulse emitted on a detected activation edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Activation {
    /// When the loop detected the edge.
    pub at: DateTime<Utc>,
}

impl Activation {
    /// Creates a pulse stamped with the deciding cycle's clock.
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at }
    }
}
