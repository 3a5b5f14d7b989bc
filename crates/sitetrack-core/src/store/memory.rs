// ── In-memory site store ──
//
// Lock-free concurrent storage keyed by `(owner, canonical_host)` with
// a secondary `(owner, id)` index. Creation goes through the DashMap
// entry API, so the existence check and the insert happen under one
// shard lock.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{CreateOutcome, SiteStore};
use crate::error::StoreError;
use crate::model::{CanonicalHost, Principal, SiteId, TrackedSite};

type SiteKey = (Principal, CanonicalHost);

/// Reference [`SiteStore`] for tests and single-process hosts.
#[derive(Debug, Default)]
pub struct InMemorySiteStore {
    /// Primary storage: `(owner, canonical_host)` -> site.
    by_key: DashMap<SiteKey, Arc<TrackedSite>>,

    /// Secondary index: `(owner, id)` -> canonical host.
    id_to_host: DashMap<(Principal, SiteId), CanonicalHost>,
}

impl InMemorySiteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    fn get_by_key(&self, owner: &Principal, host: &CanonicalHost) -> Option<Arc<TrackedSite>> {
        self.by_key
            .get(&(owner.clone(), host.clone()))
            .map(|r| Arc::clone(r.value()))
    }
}

impl SiteStore for InMemorySiteStore {
    async fn find_by_owner_and_host(
        &self,
        owner: &Principal,
        host: &CanonicalHost,
    ) -> Result<Option<TrackedSite>, StoreError> {
        Ok(self.get_by_key(owner, host).map(|s| (*s).clone()))
    }

    async fn create_if_absent(&self, site: TrackedSite) -> Result<CreateOutcome, StoreError> {
        let key = (site.owner.clone(), site.canonical_host.clone());
        match self.by_key.entry(key) {
            Entry::Occupied(existing) => Ok(CreateOutcome::Existing((**existing.get()).clone())),
            Entry::Vacant(slot) => {
                // Index first so the site is never visible by host but
                // missing by id.
                self.id_to_host.insert(
                    (site.owner.clone(), site.id.clone()),
                    site.canonical_host.clone(),
                );
                slot.insert(Arc::new(site.clone()));
                Ok(CreateOutcome::Created(site))
            }
        }
    }

    async fn get_by_id(
        &self,
        owner: &Principal,
        id: &SiteId,
    ) -> Result<Option<TrackedSite>, StoreError> {
        let Some(host) = self
            .id_to_host
            .get(&(owner.clone(), id.clone()))
            .map(|r| r.value().clone())
        else {
            return Ok(None);
        };
        Ok(self.get_by_key(owner, &host).map(|s| (*s).clone()))
    }

    async fn list_by_owner(&self, owner: &Principal) -> Result<Vec<TrackedSite>, StoreError> {
        Ok(self
            .by_key
            .iter()
            .filter(|r| &r.key().0 == owner)
            .map(|r| (**r.value()).clone())
            .collect())
    }
}
