#![allow(clippy::unwrap_used)]
// Loading, layering, validation and saving of the TOML config.

use std::path::Path;
use std::time::Duration;

use figment::Jail;
use pretty_assertions::assert_eq;

use sitetrack_config::{Config, ConfigError, load_config_from, save_config_to};
use sitetrack_core::{IdScheme, RegistryConfig};

fn load(path: &str) -> Result<Config, figment::Error> {
    load_config_from(Path::new(path)).map_err(|e| e.to_string().into())
}

// ── Loading ─────────────────────────────────────────────────────────

#[test]
fn test_defaults_without_file() {
    Jail::expect_with(|_jail| {
        let cfg = load("missing.toml")?;
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.to_registry_config().unwrap(), RegistryConfig::default());
        Ok(())
    });
}

#[test]
fn test_file_values_override_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "sitetrack.toml",
            r#"
            [defaults]
            output = "json"

            [registry]
            id_scheme = "host-only"
            store_timeout_ms = 750

            [storage]
            sites_file = "/var/lib/sitetrack/sites.json"
            "#,
        )?;

        let cfg = load("sitetrack.toml")?;
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.registry.id_scheme, IdScheme::HostOnly);
        assert_eq!(cfg.registry.session_timeout_ms, 2_000);
        assert_eq!(
            cfg.sites_file(),
            Path::new("/var/lib/sitetrack/sites.json")
        );

        let registry = cfg.to_registry_config().unwrap();
        assert_eq!(registry.store_timeout, Duration::from_millis(750));
        assert_eq!(registry.session_ttl, Duration::from_secs(3_600));
        Ok(())
    });
}

#[test]
fn test_env_overrides_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "sitetrack.toml",
            r#"
            [registry]
            store_timeout_ms = 750
            "#,
        )?;
        jail.set_env("SITETRACK_REGISTRY__STORE_TIMEOUT_MS", "120");
        jail.set_env("SITETRACK_SESSIONS__DEFAULT_TTL_SECS", "60");
        jail.set_env("SITETRACK_REGISTRY__ID_SCHEME", "host-only");

        let cfg = load("sitetrack.toml")?;
        assert_eq!(cfg.registry.store_timeout_ms, 120);
        assert_eq!(cfg.sessions.default_ttl_secs, 60);
        assert_eq!(cfg.registry.id_scheme, IdScheme::HostOnly);
        Ok(())
    });
}

#[test]
fn test_cli_env_vars_are_not_config_keys() {
    Jail::expect_with(|jail| {
        jail.set_env("SITETRACK_OWNER", "u1");
        jail.set_env("SITETRACK_OUTPUT", "json");
        jail.set_env("SITETRACK_CONFIG", "/elsewhere/config.toml");
        jail.set_env("SITETRACK_SITES_FILE", "/elsewhere/sites.json");
        // A bare top-level value would fail to extract if it were read.
        jail.set_env("SITETRACK_REGISTRY", "oops");
        jail.set_env("SITETRACK_DEFAULTS__OUTPUT", "yaml");

        let cfg = load("missing.toml")?;
        assert_eq!(cfg.defaults.output, "yaml");
        assert_eq!(cfg.registry, Config::default().registry);
        assert_eq!(cfg.storage, Config::default().storage);
        Ok(())
    });
}

#[test]
fn test_unknown_id_scheme_is_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file("bad.toml", "[registry]\nid_scheme = \"random\"\n")?;
        let err = load_config_from(Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Figment(_)), "got {err:?}");
        Ok(())
    });
}

// ── Validation ──────────────────────────────────────────────────────

#[test]
fn test_zero_timeouts_are_rejected() {
    let mut cfg = Config::default();
    cfg.registry.store_timeout_ms = 0;
    let err = cfg.to_registry_config().unwrap_err();
    assert!(
        matches!(&err, ConfigError::Validation { field, .. } if field == "registry.store_timeout_ms"),
        "got {err:?}"
    );

    let mut cfg = Config::default();
    cfg.registry.session_timeout_ms = 0;
    assert!(cfg.to_registry_config().is_err());

    let mut cfg = Config::default();
    cfg.sessions.default_ttl_secs = 0;
    assert!(cfg.to_registry_config().is_err());
}

// ── Saving ──────────────────────────────────────────────────────────

#[test]
fn test_save_then_load_preserves_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut cfg = Config::default();
    cfg.defaults.output = "yaml".into();
    cfg.registry.id_scheme = IdScheme::HostOnly;
    cfg.sessions.default_ttl_secs = 900;

    save_config_to(&cfg, &path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("id_scheme = \"host-only\""), "{written}");

    let parsed: Config = toml::from_str(&written).unwrap();
    assert_eq!(parsed, cfg);
}
