// ── Core error types ──
//
// Typed failures returned by the resolver, registrar and read paths.
// Collaborator failures arrive as `StoreError` and are classified here;
// the core never retries, it only tells the caller whether a retry
// could help.

use std::time::Duration;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Authentication ───────────────────────────────────────────────
    /// Credential missing, malformed, unknown, expired or revoked.
    #[error("Not authorized: {reason}")]
    Unauthenticated { reason: String },

    // ── Input errors ─────────────────────────────────────────────────
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid display name: {reason}")]
    InvalidName { reason: String },

    // ── Expected outcomes ────────────────────────────────────────────
    /// The owner already tracks this host. A conflict, not a defect.
    #[error("Site already exists for host {canonical_host} (id {id})")]
    AlreadyExists { canonical_host: String, id: String },

    /// Missing, or owned by someone else. Deliberately indistinguishable.
    #[error("Site not found: {id}")]
    NotFound { id: String },

    // ── Collaborator errors ──────────────────────────────────────────
    /// Store unavailable or timed out. The only retryable kind.
    #[error("Storage failure during {operation}: {reason}")]
    StorageFailure {
        operation: &'static str,
        reason: String,
    },
}

/// Fieldless classification of a [`CoreError`], for transport mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Unauthenticated,
    InvalidUrl,
    InvalidName,
    AlreadyExists,
    NotFound,
    StorageFailure,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated { .. } => ErrorKind::Unauthenticated,
            Self::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            Self::InvalidName { .. } => ErrorKind::InvalidName,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::StorageFailure { .. } => ErrorKind::StorageFailure,
        }
    }

    /// Returns `true` if the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageFailure { .. })
    }

    /// Returns `true` for outcomes of normal use that must not be
    /// logged as errors.
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. } | Self::NotFound { .. })
    }

    pub(crate) fn unauthenticated(reason: impl Into<String>) -> Self {
        Self::Unauthenticated {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_url(url: &str, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn timed_out(operation: &'static str, after: Duration) -> Self {
        Self::StorageFailure {
            operation,
            reason: format!("timed out after {}ms", after.as_millis()),
        }
    }
}

// ── Collaborator errors ──────────────────────────────────────────────

/// Failure reported by a session or site store implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Backend unreachable, overloaded, or otherwise not answering.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    /// The backend's uniqueness guard on `(owner, canonical_host)`
    /// rejected a concurrent writer.
    #[error("unique constraint violated on {constraint}")]
    UniqueViolation { constraint: String },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}
