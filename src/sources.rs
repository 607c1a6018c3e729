//! Collaborator contracts consumed by the manager.
//!
//! The manager talks to exactly two external capabilities:
//!
//! - [`SubscriptionSource`] — fetches the current [`Snapshot`] for the
//!   authenticated user; may fail with any [`FetchError`], all of which the
//!   manager treats identically (log, skip the cycle, retry next tick).
//! - [`AuthTokenSource`] — supplies the current credential, or `None` when the
//!   user is signed out. Absence is a normal value, not an error: the polling
//!   loop silently skips cycles while signed out.
//!
//! Both traits are object-safe so consumers can hand the manager `Arc<dyn ...>`
//! handles backed by their HTTP client and session store.

use async_trait::async_trait;

use crate::{error::FetchError, snapshot::Snapshot};

/// Opaque bearer credential for the billing API.
///
/// `Debug` is redacted so tokens never leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wraps a raw credential string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw credential for use in a request header.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(..)")
    }
}

/// Fetches the server's current view of the user's subscription.
#[async_trait]
pub trait SubscriptionSource: Send + Sync + 'static {
    /// Performs one fetch with the given credential.
    ///
    /// Implementations should map transport, auth and decode failures onto the
    /// corresponding [`FetchError`] variants; the manager applies its own
    /// timeout on top of this call.
    async fn fetch(&self, token: &AuthToken) -> Result<Snapshot, FetchError>;
}

/// Supplies the current session credential.
pub trait AuthTokenSource: Send + Sync + 'static {
    /// Returns the current token, or `None` when signed out.
    ///
    /// Must be quick: this is called at the top of every polling cycle.
    fn current(&self) -> Option<AuthToken>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_never_prints_the_credential() {
        let token = AuthToken::new("secret-bearer-value");
        let shown = format!("{token:?}");
        assert!(!shown.contains("secret"));
        assert_eq!(token.as_str(), "secret-bearer-value");
    }
}
