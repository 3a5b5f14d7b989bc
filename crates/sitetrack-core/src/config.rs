// ── Runtime registry configuration ──
//
// Describes how the resolver and registrar behave: which inputs feed
// the site-id digest and how long collaborator calls may take. Core
// never reads config files; `sitetrack-config` builds one of these and
// hands it in.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which inputs feed the site-id digest.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum IdScheme {
    /// Digest of `(owner, canonical_host)`. Two owners tracking the same
    /// host get distinct ids.
    #[default]
    OwnerScoped,
    /// Digest of `canonical_host` alone. Ids are stable across owners,
    /// so the same host yields the same id for everyone.
    HostOnly,
}

/// Behavioural knobs for [`SessionResolver`](crate::SessionResolver) and
/// [`Registrar`](crate::Registrar).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Site-id derivation rule.
    pub id_scheme: IdScheme,
    /// Upper bound for each site-store call.
    pub store_timeout: Duration,
    /// Upper bound for each session-store lookup.
    pub session_lookup_timeout: Duration,
    /// Lifetime of sessions issued by the in-memory session store.
    pub session_ttl: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            id_scheme: IdScheme::default(),
            store_timeout: Duration::from_secs(5),
            session_lookup_timeout: Duration::from_secs(2),
            session_ttl: Duration::from_secs(60 * 60),
        }
    }
}
