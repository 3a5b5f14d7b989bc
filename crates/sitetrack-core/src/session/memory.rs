// ── In-memory session store ──
//
// Reference `SessionStore` for tests, demos and single-process hosts.
// Tokens are never kept in the clear: entries are keyed by the hex
// SHA-256 of the presented credential.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use super::{BearerCredential, SessionLookup, SessionStore};
use crate::clock::Clock;
use crate::config::RegistryConfig;
use crate::error::StoreError;
use crate::model::Principal;

/// A freshly issued session. The credential is only ever returned here.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub credential: BearerCredential,
    pub principal: Principal,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct SessionEntry {
    principal: Principal,
    expires_at: DateTime<Utc>,
    revoked: bool,
}

/// Concurrent session table with expiry and revocation.
pub struct InMemorySessionStore {
    /// Token digest -> session.
    sessions: DashMap<String, SessionEntry>,
    /// Principal -> token digests, for bulk revocation.
    by_principal: DashMap<Principal, HashSet<String>>,
    clock: Arc<dyn Clock>,
    /// Lifetime used by [`issue_default`](Self::issue_default).
    default_ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_config(clock, &RegistryConfig::default())
    }

    /// Store whose default session lifetime is `config.session_ttl`.
    pub fn with_config(clock: Arc<dyn Clock>, config: &RegistryConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            by_principal: DashMap::new(),
            clock,
            default_ttl: config.session_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issue a credential for `principal` with the configured lifetime.
    pub fn issue_default(&self, principal: Principal) -> IssuedSession {
        self.issue(principal, self.default_ttl)
    }

    /// Issue a new random credential for `principal`, live for `ttl`.
    pub fn issue(&self, principal: Principal, ttl: Duration) -> IssuedSession {
        let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let credential = BearerCredential::new(token);
        let issued_at = self.clock.now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| issued_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.insert(&credential, principal.clone(), expires_at);
        debug!(principal = %principal, %expires_at, "session issued");

        IssuedSession {
            credential,
            principal,
            issued_at,
            expires_at,
        }
    }

    /// Register an externally minted credential.
    ///
    ///
    /// The session lands before its index entry; `purge` prunes index
    /// digests that have no session.
    pub fn insert(
        &self,
        credential: &BearerCredential,
        principal: Principal,
        expires_at: DateTime<Utc>,
    ) {
        let digest = token_digest(credential);
        self.sessions.insert(
            digest.clone(),
            SessionEntry {
                principal: principal.clone(),
                expires_at,
                revoked: false,
            },
        );
        self.by_principal.entry(principal).or_default().insert(digest);
    }

    /// Revoke one session. Returns `true` if it existed and was live.
    pub fn revoke(&self, credential: &BearerCredential) -> bool {
        self.sessions
            .get_mut(&token_digest(credential))
            .is_some_and(|mut entry| !std::mem::replace(&mut entry.revoked, true))
    }

    /// Revoke every session of `principal`. Returns how many were live.
    pub fn revoke_principal(&self, principal: &Principal) -> usize {
        let digests = self
            .by_principal
            .get(principal)
            .map(|set| set.value().clone())
            .unwrap_or_default();

        let count = digests
            .iter()
            .filter(|digest| {
                self.sessions
                    .get_mut(digest.as_str())
                    .is_some_and(|mut entry| !std::mem::replace(&mut entry.revoked, true))
            })
            .count();

        debug!(principal = %principal, count, "sessions revoked");
        count
    }

    /// Drop expired and revoked entries. Returns how many were removed.
    pub fn purge(&self) -> usize {
        let now = self.clock.now();
        let before = self.sessions.len();
        self.sessions
            .retain(|_, entry| !entry.revoked && entry.expires_at > now);

        self.by_principal.retain(|_, digests| {
            digests.retain(|d| self.sessions.contains_key(d));
            !digests.is_empty()
        });

        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for InMemorySessionStore {
    async fn lookup(
        &self,
        credential: &BearerCredential,
    ) -> Result<Option<SessionLookup>, StoreError> {
        let now = self.clock.now();
        Ok(self
            .sessions
            .get(&token_digest(credential))
            .map(|entry| SessionLookup {
                principal: entry.principal.clone(),
                is_valid: !entry.revoked && entry.expires_at > now,
            }))
    }
}

fn token_digest(credential: &BearerCredential) -> String {
    hex::encode(Sha256::digest(credential.expose().as_bytes()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::clock::ManualClock;

    fn store() -> (Arc<ManualClock>, InMemorySessionStore) {
        let clock = Arc::new(ManualClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ));
        let store = InMemorySessionStore::new(clock.clone());
        (clock, store)
    }

    #[tokio::test]
    async fn issued_session_is_live_until_expiry() {
        let (clock, store) = store();
        let issued = store.issue(Principal::new("u1"), Duration::from_secs(60));
        assert!(issued.credential.is_well_formed());
        assert_eq!(issued.expires_at - issued.issued_at, TimeDelta::seconds(60));

        let found = store.lookup(&issued.credential).await.unwrap().unwrap();
        assert!(found.is_valid);
        assert_eq!(found.principal, Principal::new("u1"));

        clock.advance(TimeDelta::seconds(60));
        let found = store.lookup(&issued.credential).await.unwrap().unwrap();
        assert!(!found.is_valid);
    }

    #[tokio::test]
    async fn unknown_credential_is_none() {
        let (_, store) = store();
        let found = store.lookup(&BearerCredential::new("nope")).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn revoke_marks_single_session() {
        let (_, store) = store();
        let a = store.issue(Principal::new("u1"), Duration::from_secs(60));
        let b = store.issue(Principal::new("u1"), Duration::from_secs(60));

        assert!(store.revoke(&a.credential));
        assert!(!store.revoke(&a.credential), "second revoke is a no-op");

        assert!(!store.lookup(&a.credential).await.unwrap().unwrap().is_valid);
        assert!(store.lookup(&b.credential).await.unwrap().unwrap().is_valid);
    }

    #[tokio::test]
    async fn revoke_principal_covers_all_sessions() {
        let (_, store) = store();
        let a = store.issue(Principal::new("u1"), Duration::from_secs(60));
        store.issue(Principal::new("u1"), Duration::from_secs(60));
        let other = store.issue(Principal::new("u2"), Duration::from_secs(60));

        assert_eq!(store.revoke_principal(&Principal::new("u1")), 2);
        assert!(!store.lookup(&a.credential).await.unwrap().unwrap().is_valid);
        assert!(store.lookup(&other.credential).await.unwrap().unwrap().is_valid);
    }

    #[test]
    fn purge_drops_dead_sessions() {
        let (clock, store) = store();
        let a = store.issue(Principal::new("u1"), Duration::from_secs(10));
        store.issue(Principal::new("u1"), Duration::from_secs(120));
        store.issue(Principal::new("u2"), Duration::from_secs(120));
        store.revoke(&a.credential);

        assert_eq!(store.purge(), 1);
        assert_eq!(store.len(), 2);

        clock.advance(TimeDelta::seconds(300));
        assert_eq!(store.purge(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn issue_default_uses_configured_ttl() {
        let clock = Arc::new(ManualClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ));
        let config = RegistryConfig {
            session_ttl: Duration::from_secs(90),
            ..RegistryConfig::default()
        };
        let store = InMemorySessionStore::with_config(clock, &config);
        assert_eq!(store.default_ttl(), Duration::from_secs(90));

        let issued = store.issue_default(Principal::new("u1"));
        assert_eq!(issued.expires_at - issued.issued_at, TimeDelta::seconds(90));
    }

    #[test]
    fn new_uses_hour_long_default_ttl() {
        let (_, store) = store();
        assert_eq!(store.default_ttl(), RegistryConfig::default().session_ttl);
    }

    #[test]
    fn sessions_issued_during_purge_stay_revocable() {
        let (_, store) = store();
        let store = Arc::new(store);
        let principal = Principal::new("u1");

        let issuers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let principal = principal.clone();
                std::thread::spawn(move || {
                    (0..250)
                        .map(|_| store.issue(principal.clone(), Duration::from_secs(60)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let purger = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for _ in 0..500 {
                    store.purge();
                }
            })
        };

        let issued: Vec<_> = issuers
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();
        purger.join().unwrap();

        assert_eq!(store.revoke_principal(&principal), issued.len());
        for session in &issued {
            let entry = store.sessions.get(&token_digest(&session.credential)).unwrap();
            assert!(entry.revoked, "session left live after revoke_principal");
        }
    }

    #[test]
    fn tokens_are_not_stored_in_clear() {
        let (_, store) = store();
        let issued = store.issue(Principal::new("u1"), Duration::from_secs(60));
        assert!(!store.sessions.contains_key(issued.credential.expose()));
    }
}
