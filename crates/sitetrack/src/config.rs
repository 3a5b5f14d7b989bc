//! CLI configuration — thin wrapper around `sitetrack_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--config, --sites-file, --output).

use std::path::PathBuf;

use clap::ValueEnum;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use sitetrack_config::{Config, save_config_to};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Config file in effect: `--config` flag, else the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(sitetrack_config::config_path)
}

/// Load config from the effective path plus `SITETRACK_*` env.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(sitetrack_config::load_config_from(&config_path(global))?)
}

/// Sites file in effect: flag > config > platform data dir.
pub fn sites_file(global: &GlobalOpts, cfg: &Config) -> PathBuf {
    global
        .sites_file
        .clone()
        .unwrap_or_else(|| cfg.sites_file())
}

/// Output format in effect: flag > `defaults.output`.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> Result<OutputFormat, CliError> {
    if let Some(format) = global.output {
        return Ok(format);
    }
    OutputFormat::from_str(&cfg.defaults.output, true).map_err(|_| CliError::Validation {
        field: "defaults.output".into(),
        reason: format!(
            "expected table, json, json-compact, yaml or plain, got '{}'",
            cfg.defaults.output
        ),
    })
}
