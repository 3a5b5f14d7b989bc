// ── TrackedSite domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::host::CanonicalHost;
use super::principal::Principal;
use super::site_id::SiteId;

/// A destination registered for observation by one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedSite {
    /// Deterministic digest, see [`SiteId::derive`].
    pub id: SiteId,
    /// Set at creation, never mutated.
    pub owner: Principal,
    /// Caller-supplied label.
    pub display_name: String,
    /// Dedup key together with `owner`.
    pub canonical_host: CanonicalHost,
    /// URL exactly as submitted, kept for display.
    pub raw_url: String,
    /// Flips once a tracking snippet is confirmed live. Always `false` here.
    pub tracked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
