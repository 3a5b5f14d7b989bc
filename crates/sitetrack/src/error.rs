//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use sitetrack_config::ConfigError;
use sitetrack_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const STORAGE: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Input ────────────────────────────────────────────────────────
    #[error("Invalid {field}: {reason}")]
    #[diagnostic(code(sitetrack::validation))]
    Validation { field: String, reason: String },

    #[error("No owner given")]
    #[diagnostic(
        code(sitetrack::no_owner),
        help("Pass --owner <ID> or set SITETRACK_OWNER.")
    )]
    NoOwner,

    // ── Registry outcomes ────────────────────────────────────────────
    #[error("Not authorized: {reason}")]
    #[diagnostic(code(sitetrack::auth_failed))]
    AuthFailed { reason: String },

    #[error("Site not found: {id}")]
    #[diagnostic(
        code(sitetrack::not_found),
        help("List registered sites with: sitetrack sites list")
    )]
    NotFound { id: String },

    #[error("Site for {host} is already registered (id {id})")]
    #[diagnostic(
        code(sitetrack::conflict),
        help("Show it with: sitetrack sites get {id}")
    )]
    Conflict { host: String, id: String },

    #[error("Storage failure during {operation}: {reason}")]
    #[diagnostic(
        code(sitetrack::storage),
        help("The operation may be retried. Check the sites file is readable and writable.")
    )]
    Storage { operation: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Config file already exists at {path}")]
    #[diagnostic(
        code(sitetrack::config_exists),
        help("Pass --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(
        code(sitetrack::config),
        help("Check the config file with: sitetrack config show")
    )]
    Config(#[from] ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(sitetrack::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } | Self::NoOwner => exit_code::USAGE,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } | Self::ConfigExists { .. } => exit_code::CONFLICT,
            Self::Storage { .. } => exit_code::STORAGE,
            Self::Config(_) | Self::Io(_) | Self::Render(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthenticated { reason } => CliError::AuthFailed { reason },

            CoreError::InvalidUrl { url, reason } => CliError::Validation {
                field: "url".into(),
                reason: format!("'{url}': {reason}"),
            },

            CoreError::InvalidName { reason } => CliError::Validation {
                field: "name".into(),
                reason,
            },

            CoreError::AlreadyExists { canonical_host, id } => CliError::Conflict {
                host: canonical_host,
                id,
            },

            CoreError::NotFound { id } => CliError::NotFound { id },

            CoreError::StorageFailure { operation, reason } => CliError::Storage {
                operation: operation.into(),
                reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_distinct_exit_codes() {
        let cases = [
            (
                CoreError::InvalidUrl {
                    url: "http://".into(),
                    reason: "empty host".into(),
                },
                exit_code::USAGE,
            ),
            (
                CoreError::InvalidName {
                    reason: "too short".into(),
                },
                exit_code::USAGE,
            ),
            (
                CoreError::Unauthenticated {
                    reason: "expired".into(),
                },
                exit_code::AUTH,
            ),
            (CoreError::NotFound { id: "ab".into() }, exit_code::NOT_FOUND),
            (
                CoreError::AlreadyExists {
                    canonical_host: "example.com".into(),
                    id: "ab".into(),
                },
                exit_code::CONFLICT,
            ),
            (
                CoreError::StorageFailure {
                    operation: "create",
                    reason: "timed out after 5000ms".into(),
                },
                exit_code::STORAGE,
            ),
        ];

        for (core, code) in cases {
            let label = core.kind();
            assert_eq!(CliError::from(core).exit_code(), code, "{label}");
        }
    }
}
