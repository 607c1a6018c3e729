//! Error types used by the subscription lifecycle manager.
//!
//! This module defines two main error enums:
//!
//! - [`FetchError`] — failures while fetching a snapshot from the subscription source.
//! - [`ManagerError`] — lifecycle misuse of the manager itself.
//!
//! Every [`FetchError`] is transient from the manager's point of view: the cycle
//! that hit it is skipped (state untouched, no alerts) and the next tick retries.
//! [`ManagerError`] is the opposite — it signals a programming-contract violation
//! by a consumer (e.g. requesting a refresh after `clear()`), and is logged loudly.
//!
//! Both types provide `as_label` for stable log/metric identifiers.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced while fetching a subscription snapshot.
///
/// The manager treats every variant identically: log, leave state unchanged,
/// retry on the next cycle. The split exists for logs and for sources that
/// want to report what actually went wrong.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure (connection refused, DNS, TLS, ...).
    #[error("network error: {message}")]
    Network {
        /// Underlying error message.
        message: String,
    },

    /// The server rejected the credential.
    #[error("auth rejected: {message}")]
    Auth {
        /// Underlying error message.
        message: String,
    },

    /// The response body could not be decoded into a snapshot.
    #[error("malformed response: {message}")]
    Decode {
        /// Underlying error message.
        message: String,
    },

    /// The fetch did not complete within the configured bound.
    #[error("fetch timed out after {timeout:?}")]
    Timeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },
}

impl FetchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use subvisor::FetchError;
    ///
    /// let err = FetchError::Network { message: "connection reset".into() };
    /// assert_eq!(err.as_label(), "fetch_network");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            FetchError::Network { .. } => "fetch_network",
            FetchError::Auth { .. } => "fetch_auth",
            FetchError::Decode { .. } => "fetch_decode",
            FetchError::Timeout { .. } => "fetch_timeout",
        }
    }
}

/// # Errors produced by the manager's control surface.
///
/// These indicate a consumer driving the lifecycle incorrectly, not a runtime
/// condition the manager recovers from. Expect an `error!`-level log next to
/// each of them.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ManagerError {
    /// `check_now`/`refresh_now` was called while the polling loop is not running
    /// (never started, stopped, or cleared on sign-out).
    #[error("manager is not running; call start() first")]
    NotRunning,

    /// The polling loop shut down while a requested cycle was still in flight;
    /// the result was discarded per the cancellation contract.
    #[error("manager stopped before the requested cycle completed")]
    Stopped,
}

impl ManagerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ManagerError::NotRunning => "manager_not_running",
            ManagerError::Stopped => "manager_stopped",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_labels_are_stable() {
        let cases = [
            (
                FetchError::Network {
                    message: "x".into(),
                },
                "fetch_network",
            ),
            (FetchError::Auth { message: "x".into() }, "fetch_auth"),
            (
                FetchError::Decode {
                    message: "x".into(),
                },
                "fetch_decode",
            ),
            (
                FetchError::Timeout {
                    timeout: Duration::from_secs(15),
                },
                "fetch_timeout",
            ),
        ];
        for (err, label) in cases {
            assert_eq!(err.as_label(), label);
        }
    }

    #[test]
    fn manager_errors_display_guidance() {
        assert!(ManagerError::NotRunning.to_string().contains("start()"));
        assert_eq!(ManagerError::Stopped.as_label(), "manager_stopped");
    }
}
