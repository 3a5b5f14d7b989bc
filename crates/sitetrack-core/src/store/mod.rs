// ── Site persistence seam ──
//
// The registrar talks to storage only through `SiteStore`. The
// uniqueness of `(owner, canonical_host)` is the store's job: the
// registrar never checks-then-inserts.

mod memory;

use std::future::Future;

use crate::error::StoreError;
use crate::model::{CanonicalHost, Principal, SiteId, TrackedSite};

pub use memory::InMemorySiteStore;

/// Outcome of an atomic [`SiteStore::create_if_absent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The candidate was persisted as given.
    Created(TrackedSite),
    /// A site with the same `(owner, canonical_host)` was already
    /// present. The candidate was discarded.
    Existing(TrackedSite),
}

/// External collaborator holding tracked sites.
///
/// Implementations must make `create_if_absent` atomic with respect to
/// `(owner, canonical_host)`: of any number of concurrent calls for the
/// same pair, exactly one may return [`CreateOutcome::Created`]. A
/// backend that enforces this with a constraint instead may report the
/// losing writer as [`StoreError::UniqueViolation`].
pub trait SiteStore: Send + Sync {
    fn find_by_owner_and_host(
        &self,
        owner: &Principal,
        host: &CanonicalHost,
    ) -> impl Future<Output = Result<Option<TrackedSite>, StoreError>> + Send;

    fn create_if_absent(
        &self,
        site: TrackedSite,
    ) -> impl Future<Output = Result<CreateOutcome, StoreError>> + Send;

    /// Owner-scoped: a site owned by someone else is `Ok(None)`.
    fn get_by_id(
        &self,
        owner: &Principal,
        id: &SiteId,
    ) -> impl Future<Output = Result<Option<TrackedSite>, StoreError>> + Send;

    /// Every site of `owner`, in no particular order.
    fn list_by_owner(
        &self,
        owner: &Principal,
    ) -> impl Future<Output = Result<Vec<TrackedSite>, StoreError>> + Send;
}
