// ── Session resolution ──
//
// Turns an already-extracted bearer credential into the owning
// principal. Read-only: nothing here issues, refreshes or revokes
// sessions. Every failure, including a slow or broken session store,
// surfaces as `Unauthenticated`.

mod memory;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::config::RegistryConfig;
use crate::error::{CoreError, StoreError};
use crate::model::Principal;

pub use memory::{InMemorySessionStore, IssuedSession};

// ── BearerCredential ────────────────────────────────────────────────

/// Opaque session credential presented by a caller.
///
/// Wraps a [`SecretString`] so the token never shows up in `Debug`
/// output or log fields.
#[derive(Clone)]
pub struct BearerCredential(SecretString);

impl BearerCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Extract the credential from an `Authorization` header value.
    ///
    /// Accepts `Bearer <token>` with the scheme matched case-insensitively.
    pub fn from_authorization_header(value: &str) -> Result<Self, CoreError> {
        let (scheme, token) = value
            .trim()
            .split_once(char::is_whitespace)
            .ok_or_else(|| CoreError::unauthenticated("authorization header has no credential"))?;

        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(CoreError::unauthenticated(
                "authorization scheme is not Bearer",
            ));
        }

        let credential = Self::new(token.trim());
        if !credential.is_well_formed() {
            return Err(CoreError::unauthenticated("malformed bearer credential"));
        }
        Ok(credential)
    }

    /// Non-empty and free of whitespace and control characters.
    pub fn is_well_formed(&self) -> bool {
        let token = self.0.expose_secret();
        !token.is_empty()
            && !token
                .chars()
                .any(|c| c.is_whitespace() || c.is_control())
    }

    /// Raw token, for session store implementations only.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerCredential([REDACTED])")
    }
}

// ── SessionStore ────────────────────────────────────────────────────

/// Result of a session lookup: who owns the credential and whether the
/// session is still live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLookup {
    pub principal: Principal,
    pub is_valid: bool,
}

/// External collaborator holding issued sessions.
pub trait SessionStore: Send + Sync {
    /// `Ok(None)` when the credential is unknown.
    fn lookup(
        &self,
        credential: &BearerCredential,
    ) -> impl Future<Output = Result<Option<SessionLookup>, StoreError>> + Send;
}

// ── SessionResolver ─────────────────────────────────────────────────

/// Resolves bearer credentials to principals, bounded by a timeout.
pub struct SessionResolver<S> {
    store: Arc<S>,
    timeout: Duration,
}

impl<S> Clone for SessionResolver<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            timeout: self.timeout,
        }
    }
}

impl<S: SessionStore> SessionResolver<S> {
    pub fn new(store: Arc<S>, config: &RegistryConfig) -> Self {
        Self {
            store,
            timeout: config.session_lookup_timeout,
        }
    }

    /// `resolve(credential) -> Principal`.
    pub async fn resolve(&self, credential: &BearerCredential) -> Result<Principal, CoreError> {
        if !credential.is_well_formed() {
            debug!("rejecting malformed credential");
            return Err(CoreError::unauthenticated("malformed bearer credential"));
        }

        let lookup = match tokio::time::timeout(self.timeout, self.store.lookup(credential)).await
        {
            Ok(Ok(lookup)) => lookup,
            Ok(Err(e)) => {
                warn!(error = %e, "session store lookup failed");
                return Err(CoreError::unauthenticated("session could not be verified"));
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "session store lookup timed out");
                return Err(CoreError::unauthenticated("session could not be verified"));
            }
        };

        match lookup {
            Some(SessionLookup {
                principal,
                is_valid: true,
            }) => {
                debug!(principal = %principal, "session resolved");
                Ok(principal)
            }
            Some(SessionLookup {
                is_valid: false, ..
            }) => Err(CoreError::unauthenticated("session expired or revoked")),
            None => Err(CoreError::unauthenticated("unknown session")),
        }
    }
}
