//! `canonicalize` — show the dedup key of each URL.

use serde::Serialize;
use tabled::Tabled;

use sitetrack_core::canonicalize;

use crate::cli::{CanonicalizeArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct Canonical {
    url: String,
    host: String,
}

#[derive(Tabled)]
struct CanonicalRow {
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Host")]
    host: String,
}

/// Fails on the first URL without a usable host.
pub fn handle(args: CanonicalizeArgs, format: OutputFormat, quiet: bool) -> Result<(), CliError> {
    let results = args
        .urls
        .into_iter()
        .map(|url| -> Result<Canonical, CliError> {
            let host = canonicalize(&url)?.to_string();
            Ok(Canonical { url, host })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let out = output::render_list(
        format,
        &results,
        |c| CanonicalRow {
            url: c.url.clone(),
            host: c.host.clone(),
        },
        |c| c.host.clone(),
    )?;
    output::print_output(&out, quiet);
    Ok(())
}
