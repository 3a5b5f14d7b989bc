//! Clap derive structures for the `sitetrack` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use sitetrack_core::IdScheme;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// sitetrack -- canonicalize, deduplicate and register tracked sites
#[derive(Debug, Parser)]
#[command(
    name = "sitetrack",
    version,
    about = "Register tracked sites, deduplicated by canonical host",
    long_about = "Canonicalizes submitted URLs down to their host, derives a\n\
        deterministic site id, and keeps a local per-owner registry of\n\
        tracked sites.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config dir)
    #[arg(long, env = "SITETRACK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Sites registry file (overrides storage.sites_file)
    #[arg(long, env = "SITETRACK_SITES_FILE", global = true)]
    pub sites_file: Option<PathBuf>,

    /// Output format (overrides defaults.output)
    #[arg(long, short = 'o', env = "SITETRACK_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the canonical host of one or more URLs
    #[command(alias = "canon")]
    Canonicalize(CanonicalizeArgs),

    /// Derive the site id for a URL and owner
    Id(IdArgs),

    /// Register and inspect tracked sites
    #[command(alias = "s")]
    Sites(SitesArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Canonicalize / Id ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CanonicalizeArgs {
    /// URLs or bare host names
    #[arg(required = true)]
    pub urls: Vec<String>,
}

#[derive(Debug, Args)]
pub struct IdArgs {
    /// URL or bare host name
    pub url: String,

    /// Owning principal
    #[arg(long, env = "SITETRACK_OWNER")]
    pub owner: String,

    /// Id derivation scheme (overrides registry.id_scheme)
    #[arg(long, value_parser = parse_id_scheme)]
    pub scheme: Option<IdScheme>,
}

fn parse_id_scheme(s: &str) -> Result<IdScheme, String> {
    s.parse()
        .map_err(|_| format!("expected 'owner-scoped' or 'host-only', got '{s}'"))
}

// ── Sites ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SitesArgs {
    /// Owning principal
    #[arg(long, env = "SITETRACK_OWNER", global = true)]
    pub owner: Option<String>,

    #[command(subcommand)]
    pub command: SitesCommand,
}

#[derive(Debug, Subcommand)]
pub enum SitesCommand {
    /// Register a new tracked site
    #[command(alias = "register")]
    Add {
        /// Display name (2-100 characters)
        #[arg(long, short = 'n')]
        name: String,

        /// URL or bare host name
        url: String,
    },

    /// List the owner's tracked sites
    #[command(alias = "ls")]
    List,

    /// Show one site by id
    Get {
        /// Site id (64 hex characters)
        id: String,
    },

    /// Find the owner's site for a URL's host
    Find {
        /// URL or bare host name
        url: String,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
