// ── Request-facing facade ──
//
// Composes the resolver and the registrar into credential-first entry
// points. Each call resolves the caller before touching the site store,
// so an HTTP layer on top only has to map `ErrorKind` to a status.

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::RegistryConfig;
use crate::error::CoreError;
use crate::model::{SiteId, TrackedSite};
use crate::registrar::Registrar;
use crate::session::{BearerCredential, SessionResolver, SessionStore};
use crate::store::SiteStore;

/// Cheaply cloneable handle over both collaborators.
pub struct SiteService<Sess, Sites> {
    resolver: SessionResolver<Sess>,
    registrar: Registrar<Sites>,
}

impl<Sess, Sites> Clone for SiteService<Sess, Sites> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            registrar: self.registrar.clone(),
        }
    }
}

impl<Sess: SessionStore, Sites: SiteStore> SiteService<Sess, Sites> {
    pub fn new(
        sessions: Arc<Sess>,
        sites: Arc<Sites>,
        clock: Arc<dyn Clock>,
        config: RegistryConfig,
    ) -> Self {
        Self {
            resolver: SessionResolver::new(sessions, &config),
            registrar: Registrar::new(sites, clock, config),
        }
    }

    pub fn resolver(&self) -> &SessionResolver<Sess> {
        &self.resolver
    }

    pub fn registrar(&self) -> &Registrar<Sites> {
        &self.registrar
    }

    /// Resolve the caller, then register `raw_url` under their name.
    pub async fn register(
        &self,
        credential: &BearerCredential,
        name: &str,
        raw_url: &str,
    ) -> Result<TrackedSite, CoreError> {
        let owner = self.resolver.resolve(credential).await?;
        self.registrar.register(&owner, name, raw_url).await
    }

    pub async fn get(
        &self,
        credential: &BearerCredential,
        id: &SiteId,
    ) -> Result<TrackedSite, CoreError> {
        let owner = self.resolver.resolve(credential).await?;
        self.registrar.get_by_id(&owner, id).await
    }

    pub async fn list(&self, credential: &BearerCredential) -> Result<Vec<TrackedSite>, CoreError> {
        let owner = self.resolver.resolve(credential).await?;
        self.registrar.list_by_owner(&owner).await
    }
}
