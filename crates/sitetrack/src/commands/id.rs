//! `id` — derive a site id without touching the registry.

use serde::Serialize;

use sitetrack_core::{IdScheme, Principal, SiteId, canonicalize};

use crate::cli::{IdArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct Derived {
    id: SiteId,
    owner: Principal,
    canonical_host: String,
    scheme: IdScheme,
}

pub fn handle(
    args: IdArgs,
    default_scheme: IdScheme,
    format: OutputFormat,
    quiet: bool,
) -> Result<(), CliError> {
    let host = canonicalize(&args.url)?;
    let owner = Principal::new(args.owner);
    let scheme = args.scheme.unwrap_or(default_scheme);

    let derived = Derived {
        id: SiteId::derive(scheme, &owner, &host),
        owner,
        canonical_host: host.to_string(),
        scheme,
    };

    let out = output::render_single(
        format,
        &derived,
        |d| {
            format!(
                "ID:      {}\nOwner:   {}\nHost:    {}\nScheme:  {}",
                d.id, d.owner, d.canonical_host, d.scheme
            )
        },
        |d| d.id.to_string(),
    )?;
    output::print_output(&out, quiet);
    Ok(())
}
