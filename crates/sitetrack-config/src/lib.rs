//! Shared configuration for the sitetrack CLI and embedding services.
//!
//! TOML file at the platform config directory, layered under
//! `SITETRACK_`-prefixed environment variables, and translation to
//! `sitetrack_core::RegistryConfig`. The CLI adds `GlobalOpts`-aware
//! wrappers on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sitetrack_core::{IdScheme, RegistryConfig};

/// Prefix for environment overrides. Nested keys are separated by a
/// double underscore: `SITETRACK_REGISTRY__STORE_TIMEOUT_MS=250`.
/// Un-nested variables such as `SITETRACK_OUTPUT` belong to the CLI and
/// are not read as config keys.
pub const ENV_PREFIX: &str = "SITETRACK_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Global CLI defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Registration behaviour and collaborator timeouts.
    #[serde(default)]
    pub registry: RegistrySection,

    /// Issued-session lifetimes.
    #[serde(default)]
    pub sessions: SessionsSection,

    /// Where the CLI keeps its local site registry.
    #[serde(default)]
    pub storage: StorageSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    /// `table`, `json`, `json-compact`, `yaml` or `plain`.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegistrySection {
    #[serde(default)]
    pub id_scheme: IdScheme,

    /// Upper bound per site-store call, in milliseconds.
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    /// Upper bound per session lookup, in milliseconds.
    #[serde(default = "default_session_timeout_ms")]
    pub session_timeout_ms: u64,
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            id_scheme: IdScheme::default(),
            store_timeout_ms: default_store_timeout_ms(),
            session_timeout_ms: default_session_timeout_ms(),
        }
    }
}

fn default_store_timeout_ms() -> u64 {
    5_000
}
fn default_session_timeout_ms() -> u64 {
    2_000
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionsSection {
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,
}

impl Default for SessionsSection {
    fn default() -> Self {
        Self {
            default_ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    3_600
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StorageSection {
    /// JSON file holding tracked sites. Defaults to the platform data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sites_file: Option<PathBuf>,
}

impl Config {
    /// Validate and translate into the core's runtime configuration.
    pub fn to_registry_config(&self) -> Result<RegistryConfig, ConfigError> {
        Ok(RegistryConfig {
            id_scheme: self.registry.id_scheme,
            store_timeout: non_zero_millis(
                "registry.store_timeout_ms",
                self.registry.store_timeout_ms,
            )?,
            session_lookup_timeout: non_zero_millis(
                "registry.session_timeout_ms",
                self.registry.session_timeout_ms,
            )?,
            session_ttl: match self.sessions.default_ttl_secs {
                0 => {
                    return Err(ConfigError::Validation {
                        field: "sessions.default_ttl_secs".into(),
                        reason: "must be greater than zero".into(),
                    });
                }
                secs => Duration::from_secs(secs),
            },
        })
    }

    /// The sites file: configured path, else `sites.json` in the data dir.
    pub fn sites_file(&self) -> PathBuf {
        self.storage
            .sites_file
            .clone()
            .unwrap_or_else(|| data_dir().join("sites.json"))
    }
}

fn non_zero_millis(field: &str, millis: u64) -> Result<Duration, ConfigError> {
    if millis == 0 {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(Duration::from_millis(millis))
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "sitetrack", "sitetrack")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Platform data directory for local state.
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(dirs_fallback, |dirs| dirs.data_dir().to_path_buf())
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("sitetrack");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load from an explicit file + environment. A missing file is not an
/// error; defaults and env still apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(
            Env::prefixed(ENV_PREFIX)
                .filter(|key| key.as_str().contains("__"))
                .split("__"),
        );

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parents.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
