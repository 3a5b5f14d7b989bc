// ── Deterministic site identifiers ──
//
// A SiteId is the lowercase hex SHA-256 of the inputs selected by the
// configured `IdScheme`. Re-deriving from the same inputs always gives
// the same id, so a resubmitted host is recognisable without a random
// id or an extra index.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::host::CanonicalHost;
use super::principal::Principal;
use crate::config::IdScheme;

/// Hex-encoded SHA-256 digest identifying a tracked site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(String);

impl SiteId {
    /// Derive the id for `host` as registered by `owner`.
    ///
    /// Under [`IdScheme::OwnerScoped`] the owner is length-prefixed ahead
    /// of the host so no `(owner, host)` split can collide with another.
    pub fn derive(scheme: IdScheme, owner: &Principal, host: &CanonicalHost) -> Self {
        let mut hasher = Sha256::new();
        if scheme == IdScheme::OwnerScoped {
            let owner = owner.as_str().as_bytes();
            hasher.update(u64::try_from(owner.len()).unwrap_or(u64::MAX).to_le_bytes());
            hasher.update(owner);
        }
        hasher.update(host.as_str().as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SiteId {
    type Err = std::convert::Infallible;

    /// Ids arriving from callers are only case-folded; an unknown or
    /// malformed id simply never matches a stored site.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().to_ascii_lowercase()))
    }
}

impl From<&str> for SiteId {
    fn from(s: &str) -> Self {
        Self(s.trim().to_ascii_lowercase())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn host(raw: &str) -> CanonicalHost {
        CanonicalHost::parse(raw).unwrap()
    }

    #[test]
    fn host_only_matches_plain_sha256_of_host() {
        let id = SiteId::derive(IdScheme::HostOnly, &Principal::new("u1"), &host("example.com"));
        assert_eq!(
            id.as_str(),
            "a379a6f6eeafb9a55e378c118034e2751e682fab9f2d30ab13d2125586ce1947"
        );
    }

    #[test]
    fn host_only_ignores_owner() {
        let h = host("example.com");
        assert_eq!(
            SiteId::derive(IdScheme::HostOnly, &Principal::new("u1"), &h),
            SiteId::derive(IdScheme::HostOnly, &Principal::new("u2"), &h),
        );
    }

    #[test]
    fn owner_scoped_separates_owners() {
        let h = host("example.com");
        let a = SiteId::derive(IdScheme::OwnerScoped, &Principal::new("u1"), &h);
        let b = SiteId::derive(IdScheme::OwnerScoped, &Principal::new("u2"), &h);
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn owner_prefix_is_unambiguous() {
        // "ab" + "c.example" vs "a" + "bc.example" must not collide.
        let x = SiteId::derive(IdScheme::OwnerScoped, &Principal::new("ab"), &host("c.example"));
        let y = SiteId::derive(IdScheme::OwnerScoped, &Principal::new("a"), &host("bc.example"));
        assert_ne!(x, y);
    }

    #[test]
    fn parsing_folds_case() {
        let id: SiteId = " ABCDEF ".parse().unwrap();
        assert_eq!(id.as_str(), "abcdef");
    }
}
