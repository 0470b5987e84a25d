//! Integration tests for TOML and environment configuration loading.
//!
//! Uses `figment::Jail` for sandboxed files and env vars.

use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;
use sift_config::{ConfigError, SiftConfig};

#[test]
fn loads_sections_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[database]
path = "/var/lib/sift/review.db"

[general]
default_limit = 50
"#,
        )?;

        let config: SiftConfig = Figment::from(Serialized::defaults(SiftConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.database.path, "/var/lib/sift/review.db");
        assert_eq!(config.general.default_limit, 50);
        Ok(())
    });
}

#[test]
fn project_local_file_is_picked_up() {
    Jail::expect_with(|jail| {
        jail.create_dir(".sift")?;
        jail.create_file(".sift/config.toml", "[database]\npath = \"local.db\"\n")?;

        let config = SiftConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(config.database.path, "local.db");
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_dir(".sift")?;
        jail.create_file(".sift/config.toml", "[general]\ndefault_limit = 5\n")?;
        jail.set_env("SIFT_GENERAL__DEFAULT_LIMIT", "75");
        jail.set_env("SIFT_DATABASE__PATH", ":memory:");

        let config = SiftConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(config.general.default_limit, 75);
        assert!(config.database.is_in_memory());
        Ok(())
    });
}

#[test]
fn blank_database_path_is_rejected() {
    Jail::expect_with(|jail| {
        jail.create_dir(".sift")?;
        jail.create_file(".sift/config.toml", "[database]\npath = \"   \"\n")?;

        let result = SiftConfig::load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        Ok(())
    });
}

#[test]
fn malformed_value_surfaces_figment_error() {
    Jail::expect_with(|jail| {
        jail.set_env("SIFT_GENERAL__DEFAULT_LIMIT", "many");

        let result = SiftConfig::load();
        assert!(matches!(result, Err(ConfigError::Figment(_))));
        Ok(())
    });
}
