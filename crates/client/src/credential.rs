//! Credential providers.
//!
//! The request layer never reaches for ambient auth state. Every [`ApiClient`]
//! is built with an explicit [`CredentialProvider`] that hands out the current
//! bearer token, or nothing when the user is signed out.
//!
//! [`ApiClient`]: crate::ApiClient

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use secrecy::SecretString;

/// Source of the bearer token attached to authenticated requests.
pub trait CredentialProvider: Send + Sync {
    /// The current token, or `None` when no session exists.
    fn token(&self) -> impl Future<Output = Option<SecretString>> + Send;

    /// Whether a session currently exists.
    fn is_signed_in(&self) -> bool;
}

/// A fixed, optional token.
#[derive(Clone, Default)]
pub struct StaticCredential(Option<SecretString>);

impl StaticCredential {
    #[must_use]
    pub const fn new(token: Option<SecretString>) -> Self {
        Self(token)
    }

    /// A provider that never yields a token.
    #[must_use]
    pub const fn none() -> Self {
        Self(None)
    }
}

impl From<SecretString> for StaticCredential {
    fn from(token: SecretString) -> Self {
        Self(Some(token))
    }
}

impl std::fmt::Debug for StaticCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StaticCredential")
            .field(&self.0.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl CredentialProvider for StaticCredential {
    async fn token(&self) -> Option<SecretString> {
        self.0.clone()
    }

    fn is_signed_in(&self) -> bool {
        self.0.is_some()
    }
}

/// A token that follows the identity provider's session.
///
/// Clones share the same session, so a sign-out is seen by every client
/// holding a clone.
#[derive(Clone, Default)]
pub struct SessionCredential {
    token: Arc<RwLock<Option<SecretString>>>,
}

impl SessionCredential {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the token issued for a new session.
    pub fn sign_in(&self, token: SecretString) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
        tracing::debug!("Session credential stored");
    }

    /// Drop the current token.
    pub fn sign_out(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        tracing::debug!("Session credential cleared");
    }
}

impl std::fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCredential")
            .field("signed_in", &self.is_signed_in())
            .finish()
    }
}

impl CredentialProvider for SessionCredential {
    async fn token(&self) -> Option<SecretString> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn is_signed_in(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[tokio::test]
    async fn test_static_credential() {
        let cred = StaticCredential::from(SecretString::from("tok"));
        assert!(cred.is_signed_in());
        let token = cred.token().await.map(|t| t.expose_secret().to_string());
        assert_eq!(token.as_deref(), Some("tok"));

        let none = StaticCredential::none();
        assert!(!none.is_signed_in());
        assert!(none.token().await.is_none());
    }

    #[tokio::test]
    async fn test_session_sign_in_out_shared_between_clones() {
        let session = SessionCredential::new();
        let observer = session.clone();
        assert!(!observer.is_signed_in());

        session.sign_in(SecretString::from("jwt"));
        assert!(observer.is_signed_in());
        assert!(observer.token().await.is_some());

        session.sign_out();
        assert!(!observer.is_signed_in());
        assert!(observer.token().await.is_none());
    }

    #[test]
    fn test_debug_redacts() {
        let cred = StaticCredential::from(SecretString::from("very-secret"));
        let out = format!("{cred:?}");
        assert!(!out.contains("very-secret"));
        assert!(out.contains("[REDACTED]"));
    }
}
