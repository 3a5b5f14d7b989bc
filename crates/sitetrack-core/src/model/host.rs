// ── Canonical host ──
//
// The dedup key for a tracked site. Scheme, userinfo, port, path,
// query and fragment are dropped; the host is case-folded and loses
// any trailing root separator.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CoreError;

/// Shortest raw URL accepted, after trimming.
const MIN_URL_LEN: usize = 3;

/// Normalized host name of a submitted URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalHost(String);

impl CanonicalHost {
    /// Canonicalize a caller-supplied URL.
    ///
    /// Input without a `scheme://` prefix is read as `http://{input}`, so
    /// `Example.com/path` and `https://example.com` both yield
    /// `example.com`. Fails with [`CoreError::InvalidUrl`] when no host
    /// can be extracted.
    pub fn parse(raw_url: &str) -> Result<Self, CoreError> {
        let trimmed = raw_url.trim();
        if trimmed.chars().count() < MIN_URL_LEN {
            return Err(CoreError::invalid_url(
                raw_url,
                format!("must be at least {MIN_URL_LEN} characters"),
            ));
        }

        let parsed = if has_scheme(trimmed) {
            Url::parse(trimmed)
        } else {
            Url::parse(&format!("http://{trimmed}"))
        }
        .map_err(|e| CoreError::invalid_url(raw_url, e.to_string()))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| CoreError::invalid_url(raw_url, "no host component"))?;

        // `url` already folds case for special schemes; opaque hosts of
        // other schemes are left as written.
        let folded = host.trim_end_matches('.').to_ascii_lowercase();
        if folded.is_empty() {
            return Err(CoreError::invalid_url(raw_url, "empty host"));
        }

        Ok(Self(folded))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// True when `://` appears before any path, query or fragment delimiter.
fn has_scheme(input: &str) -> bool {
    input
        .find("://")
        .is_some_and(|at| !input[..at].contains(['/', '?', '#']))
}

impl fmt::Display for CanonicalHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonicalize `raw_url` into its dedup key.
pub fn canonicalize(raw_url: &str) -> Result<CanonicalHost, CoreError> {
    CanonicalHost::parse(raw_url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn host(raw: &str) -> String {
        canonicalize(raw).unwrap().as_str().to_owned()
    }

    #[test]
    fn strips_scheme_path_query_and_case() {
        assert_eq!(host("https://Example.com/path?x=1"), "example.com");
        assert_eq!(host("http://EXAMPLE.COM/"), "example.com");
        assert_eq!(host("HTTPS://example.com#frag"), "example.com");
    }

    #[test]
    fn accepts_bare_hosts() {
        assert_eq!(host("example.com"), "example.com");
        assert_eq!(host("  Example.COM/landing  "), "example.com");
        assert_eq!(host("localhost:3000/app"), "localhost");
        assert_eq!(host("example.com/?ref=https://google.com"), "example.com");
        assert_eq!(host("Example.com#https://other.org"), "example.com");
        assert_eq!(host("example.com?next=ftp://files.example.org"), "example.com");
    }

    #[test]
    fn drops_port_userinfo_and_trailing_dot() {
        assert_eq!(host("https://user:pw@example.com:8443/x"), "example.com");
        assert_eq!(host("https://example.com./"), "example.com");
    }

    #[test]
    fn keeps_subdomains_distinct() {
        assert_eq!(host("https://www.example.com"), "www.example.com");
        assert_ne!(host("https://www.example.com"), host("https://example.com"));
    }

    #[test]
    fn normalizes_international_and_ip_hosts() {
        assert_eq!(host("https://BÜCHER.example/"), "xn--bcher-kva.example");
        assert_eq!(host("http://127.0.0.1:8080/"), "127.0.0.1");
        assert_eq!(host("http://[::1]/"), "[::1]");
    }

    #[test]
    fn lowercases_opaque_hosts() {
        assert_eq!(host("custom://Example.ORG/x"), "example.org");
    }

    #[test]
    fn rejects_inputs_without_host() {
        for raw in ["", "  ", "ab", "file:///tmp/x", "http://", "https://exa mple.com"] {
            let err = canonicalize(raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidUrl, "input {raw:?} gave {err:?}");
        }
    }
}
