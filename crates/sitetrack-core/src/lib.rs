//! Session resolution and deduplicated site registration.
//!
//! This crate owns the request-scoped core of the sitetrack workspace:
//!
//! - **[`SessionResolver`]** — Turns a [`BearerCredential`] into the owning
//!   [`Principal`] through a [`SessionStore`]. Any failure, including a slow
//!   or broken store, is [`CoreError::Unauthenticated`].
//!
//! - **[`Registrar`]** — Canonicalizes a submitted URL to its host,
//!   derives a deterministic [`SiteId`], and creates the [`TrackedSite`]
//!   through a single atomic [`SiteStore::create_if_absent`] call. Also
//!   serves the owner-scoped `get_by_id` / `list_by_owner` reads.
//!
//! - **[`SiteService`]** — Credential-first facade composing both, for
//!   transports that just need to map [`ErrorKind`] to a status code.
//!
//! - **Collaborators** — [`SessionStore`], [`SiteStore`] and [`Clock`] are
//!   injected. [`InMemorySessionStore`] and [`InMemorySiteStore`] are
//!   `DashMap`-backed reference implementations.
//!
//! Every collaborator call is bounded by the timeouts in
//! [`RegistryConfig`].

pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod registrar;
pub mod service;
pub mod session;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{IdScheme, RegistryConfig};
pub use error::{CoreError, ErrorKind, StoreError};
pub use model::{CanonicalHost, Principal, SiteId, TrackedSite, canonicalize};
pub use registrar::{Registrar, validate_display_name};
pub use service::SiteService;
pub use session::{
    BearerCredential, InMemorySessionStore, IssuedSession, SessionLookup, SessionResolver,
    SessionStore,
};
pub use store::{CreateOutcome, InMemorySiteStore, SiteStore};
