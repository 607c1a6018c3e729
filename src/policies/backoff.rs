//! # Backoff policy for failed fetch cycles.
//!
//! [`BackoffPolicy`] controls how retry delays grow while the subscription
//! source keeps failing. It is parameterized by:
//! - [`BackoffPolicy::first`] the delay after the first failure;
//! - [`BackoffPolicy::factor`] the multiplicative growth factor;
//! - [`BackoffPolicy::max`] the maximum delay cap.
//!
//! The delay after `n` consecutive failures is `first × factor^(n-1)`, clamped
//! to `max`, then jitter is applied. The base delay derives purely from the
//! failure count, so jitter output never feeds back into later calculations.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use subvisor::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_secs(30),
//!     max: Duration::from_secs(600),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(1), Duration::from_secs(30));
//! assert_eq!(backoff.next(2), Duration::from_secs(60));
//! // 30s × 2^9 ≫ 600s → capped at max
//! assert_eq!(backoff.next(10), Duration::from_secs(600));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Retry backoff policy for consecutive fetch failures.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Delay after the first failure.
    pub first: Duration,
    /// Maximum delay cap.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Jitter applied to the clamped base delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns a strategy with:
    /// - `first = 30s`;
    /// - `factor = 2.0` (doubling);
    /// - `max = 10min`;
    /// - no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_secs(30),
            max: Duration::from_secs(600),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay after `failures` consecutive failures (1-indexed).
    ///
    /// `failures = 0` is treated as 1 (a delay is only ever requested after at
    /// least one failure). Overflowing or non-finite intermediate values clamp
    /// to [`BackoffPolicy::max`].
    pub fn next(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(i32::MAX as u32) as i32;
        let max_secs = self.max.as_secs_f64();
        let raw_secs = self.first.as_secs_f64() * self.factor.powi(exponent);

        let base = if !raw_secs.is_finite() || raw_secs < 0.0 || raw_secs > max_secs {
            self.max
        } else {
            Duration::from_secs_f64(raw_secs)
        };

        self.jitter.apply(base)
    }
}
