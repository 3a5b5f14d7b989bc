// ── Domain model ──
//
// Newtype identifiers and the TrackedSite record. Every type here is
// plain data; behaviour lives in the resolver and registrar.

mod host;
mod principal;
mod site;
mod site_id;

pub use host::{CanonicalHost, canonicalize};
pub use principal::Principal;
pub use site::TrackedSite;
pub use site_id::SiteId;
