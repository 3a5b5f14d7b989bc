// ── Resource registrar ──
//
// Canonicalizes a submitted URL, derives the deterministic site id and
// asks the store to create the site atomically. Also serves the
// owner-scoped read paths. Holds no mutable state of its own.

use std::future::Future;
use std::sync::Arc;

use tracing::{Instrument, debug, info, info_span, warn};

use crate::clock::Clock;
use crate::config::RegistryConfig;
use crate::error::{CoreError, StoreError};
use crate::model::{CanonicalHost, Principal, SiteId, TrackedSite, canonicalize};
use crate::store::{CreateOutcome, SiteStore};

/// Accepted display name length, in characters, after trimming.
const NAME_LEN: std::ops::RangeInclusive<usize> = 2..=100;

/// Registers and reads tracked sites on behalf of an authenticated owner.
pub struct Registrar<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    config: RegistryConfig,
}

impl<S> Clone for Registrar<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            config: self.config.clone(),
        }
    }
}

impl<S: SiteStore> Registrar<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: RegistryConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// `register(owner, name, raw_url) -> TrackedSite`.
    ///
    /// Never overwrites: a second registration of the same host by the
    /// same owner, concurrent or not, fails with
    /// [`CoreError::AlreadyExists`] naming the existing site.
    pub async fn register(
        &self,
        owner: &Principal,
        name: &str,
        raw_url: &str,
    ) -> Result<TrackedSite, CoreError> {
        let display_name = validate_display_name(name)?;
        let host = canonicalize(raw_url)?;
        let id = SiteId::derive(self.config.id_scheme, owner, &host);
        debug!(canonical_host = %host, %id, scheme = %self.config.id_scheme, "derived site id");

        let span = info_span!("register", owner = %owner, canonical_host = %host);
        self.create(owner, display_name, raw_url, &host, &id)
            .instrument(span)
            .await
    }

    async fn create(
        &self,
        owner: &Principal,
        display_name: String,
        raw_url: &str,
        host: &CanonicalHost,
        id: &SiteId,
    ) -> Result<TrackedSite, CoreError> {
        let now = self.clock.now();
        let candidate = TrackedSite {
            id: id.clone(),
            owner: owner.clone(),
            display_name,
            canonical_host: host.clone(),
            raw_url: raw_url.to_owned(),
            tracked: false,
            created_at: now,
            updated_at: now,
        };

        match self
            .bounded("create", self.store.create_if_absent(candidate))
            .await?
        {
            Ok(CreateOutcome::Created(site)) => {
                info!(id = %site.id, "site registered");
                Ok(site)
            }
            Ok(CreateOutcome::Existing(existing)) => {
                debug!(id = %existing.id, "site already registered");
                Err(CoreError::AlreadyExists {
                    canonical_host: existing.canonical_host.to_string(),
                    id: existing.id.to_string(),
                })
            }
            Err(StoreError::UniqueViolation { constraint }) => {
                // Same owner and host always derive the same id.
                debug!(%constraint, "concurrent registration lost the race");
                Err(CoreError::AlreadyExists {
                    canonical_host: host.to_string(),
                    id: id.to_string(),
                })
            }
            Err(e) => Err(storage_failure("create", &e)),
        }
    }

    /// Fetch one site of `owner`. Someone else's id is `NotFound`.
    pub async fn get_by_id(&self, owner: &Principal, id: &SiteId) -> Result<TrackedSite, CoreError> {
        self.bounded("get", self.store.get_by_id(owner, id))
            .await?
            .map_err(|e| storage_failure("get", &e))?
            .ok_or_else(|| {
                debug!(owner = %owner, %id, "site not found");
                CoreError::NotFound { id: id.to_string() }
            })
    }

    /// All sites of `owner`, oldest first, ties broken by host.
    pub async fn list_by_owner(&self, owner: &Principal) -> Result<Vec<TrackedSite>, CoreError> {
        let mut sites = self
            .bounded("list", self.store.list_by_owner(owner))
            .await?
            .map_err(|e| storage_failure("list", &e))?;
        sites.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.canonical_host.cmp(&b.canonical_host))
        });
        Ok(sites)
    }

    /// The site `owner` already tracks for `raw_url`'s host, if any.
    pub async fn lookup_by_url(
        &self,
        owner: &Principal,
        raw_url: &str,
    ) -> Result<Option<TrackedSite>, CoreError> {
        let host = canonicalize(raw_url)?;
        self.bounded("find", self.store.find_by_owner_and_host(owner, &host))
            .await?
            .map_err(|e| storage_failure("find", &e))
    }

    /// Run a store call under the configured timeout. The outer error is
    /// the timeout; the inner result is the store's own answer.
    async fn bounded<T: Send>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, StoreError>> + Send,
    ) -> Result<Result<T, StoreError>, CoreError> {
        let limit = self.config.store_timeout;
        tokio::time::timeout(limit, call).await.map_err(|_| {
            warn!(operation, timeout = ?limit, "site store call timed out");
            CoreError::timed_out(operation, limit)
        })
    }
}

fn storage_failure(operation: &'static str, error: &StoreError) -> CoreError {
    warn!(operation, error = %error, "site store call failed");
    CoreError::StorageFailure {
        operation,
        reason: error.to_string(),
    }
}

/// Trim `name` and check its length. Returns the trimmed name.
pub fn validate_display_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if NAME_LEN.contains(&len) {
        Ok(trimmed.to_owned())
    } else {
        Err(CoreError::InvalidName {
            reason: format!(
                "must be {}-{} characters, got {len}",
                NAME_LEN.start(),
                NAME_LEN.end()
            ),
        })
    }
}
