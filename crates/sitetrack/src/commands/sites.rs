//! `sites` — register and read tracked sites through the registrar.

use std::sync::Arc;

use chrono::SecondsFormat;
use tabled::Tabled;

use sitetrack_core::{Principal, Registrar, RegistryConfig, SiteId, SystemClock, TrackedSite};

use crate::cli::{OutputFormat, SitesArgs, SitesCommand};
use crate::error::CliError;
use crate::output;
use crate::store::JsonFileSiteStore;

// ── Rendering ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Tracked")]
    tracked: String,
    #[tabled(rename = "Created")]
    created: String,
}

fn site_row(s: &TrackedSite) -> SiteRow {
    SiteRow {
        id: short_id(&s.id),
        name: s.display_name.clone(),
        host: s.canonical_host.to_string(),
        tracked: if s.tracked { "yes" } else { "no" }.into(),
        created: s.created_at.format("%Y-%m-%d %H:%M").to_string(),
    }
}

/// First 12 hex digits, enough to eyeball in a table.
fn short_id(id: &SiteId) -> String {
    id.as_str().chars().take(12).collect()
}

fn detail(s: &TrackedSite) -> String {
    format!(
        "ID:       {}\n\
         Name:     {}\n\
         Host:     {}\n\
         URL:      {}\n\
         Owner:    {}\n\
         Tracked:  {}\n\
         Created:  {}\n\
         Updated:  {}",
        s.id,
        s.display_name,
        s.canonical_host,
        s.raw_url,
        s.owner,
        s.tracked,
        s.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        s.updated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}

fn render_site(format: OutputFormat, site: &TrackedSite) -> Result<String, CliError> {
    output::render_single(format, site, detail, |s| s.id.to_string())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    args: SitesArgs,
    store: JsonFileSiteStore,
    registry: RegistryConfig,
    format: OutputFormat,
    quiet: bool,
) -> Result<(), CliError> {
    let owner = args.owner.map(Principal::new).ok_or(CliError::NoOwner)?;
    let registrar = Registrar::new(Arc::new(store), Arc::new(SystemClock), registry);

    let out = match args.command {
        SitesCommand::Add { name, url } => {
            let site = registrar.register(&owner, &name, &url).await?;
            render_site(format, &site)?
        }

        SitesCommand::List => {
            let sites = registrar.list_by_owner(&owner).await?;
            output::render_list(format, &sites, site_row, |s| s.id.to_string())?
        }

        SitesCommand::Get { id } => {
            let id: SiteId = id.as_str().into();
            let site = registrar.get_by_id(&owner, &id).await?;
            render_site(format, &site)?
        }

        SitesCommand::Find { url } => match registrar.lookup_by_url(&owner, &url).await? {
            Some(site) => render_site(format, &site)?,
            None => {
                return Err(CliError::NotFound { id: url });
            }
        },
    };

    output::print_output(&out, quiet);
    Ok(())
}
