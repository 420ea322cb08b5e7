use realty_core::{ConfigManager, DatabaseBackend, Locale};
use secrecy::ExposeSecret;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_missing_files_fall_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let settings = ConfigManager::load_from_sources(temp_dir.path(), "test").unwrap();

    assert_eq!(settings.env, "test");
    assert_eq!(settings.server.port, 3000);
    assert_eq!(settings.database.backend, DatabaseBackend::Memory);
    assert_eq!(settings.site.default_locale, Locale::Cs);
}

#[test]
fn test_environment_file_overrides_default() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("default.toml"),
        r#"
[server]
host = "127.0.0.1"
port = 8080

[site]
default_locale = "en"
"#,
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("production.toml"),
        r#"
[server]
host = "0.0.0.0"
port = 80

[database]
backend = "rest"

[database.rest]
url = "https://project.db.example.com"
api_key = "service-role-key"
"#,
    )
    .unwrap();

    let settings = ConfigManager::load_from_sources(temp_dir.path(), "production").unwrap();
    assert_eq!(settings.server.port, 80);
    assert_eq!(settings.site.default_locale, Locale::En);
    assert_eq!(settings.database.backend, DatabaseBackend::Rest);
    assert_eq!(
        settings
            .database
            .rest
            .api_key
            .as_ref()
            .map(|k| k.expose_secret().to_string()),
        Some("service-role-key".to_string())
    );
    settings.validate().unwrap();

    let development = ConfigManager::load_from_sources(temp_dir.path(), "development").unwrap();
    assert_eq!(development.server.port, 8080);
    assert_eq!(development.database.backend, DatabaseBackend::Memory);
}

#[test]
fn test_local_file_wins_over_environment_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("staging.toml"),
        "[security]\nlogin_attempts_per_minute = 10\n",
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("local.toml"),
        "[security]\nlogin_attempts_per_minute = 3\n",
    )
    .unwrap();

    let settings = ConfigManager::load_from_sources(temp_dir.path(), "staging").unwrap();
    assert_eq!(settings.security.login_attempts_per_minute, 3);
}

#[test]
fn test_env_variables_override_files() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("default.toml"),
        "[logging]\nlevel = \"warn\"\n",
    )
    .unwrap();

    std::env::set_var("REALTY__LOGGING__LEVEL", "debug");
    let settings = ConfigManager::load_from_sources(temp_dir.path(), "test").unwrap();
    std::env::remove_var("REALTY__LOGGING__LEVEL");

    assert_eq!(settings.logging.level, "debug");
}

#[test]
fn test_manager_rejects_invalid_settings() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("default.toml"),
        "[database]\nbackend = \"rest\"\n",
    )
    .unwrap();

    let result = ConfigManager::new(Some(temp_dir.path().to_path_buf()), Some("test".into()));
    assert!(result.is_err());
}

#[test]
fn test_manager_exposes_loaded_settings() {
    let temp_dir = TempDir::new().unwrap();
    let manager =
        ConfigManager::new(Some(temp_dir.path().to_path_buf()), Some("ci".into())).unwrap();
    assert_eq!(manager.env(), "ci");
    assert_eq!(manager.config_dir(), temp_dir.path());
    assert_eq!(manager.settings().env, "ci");
}

#[test]
fn test_seed_path_is_relative_to_config_dir() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("default.toml"),
        "[database]\nseed_path = \"seed.json\"\n",
    )
    .unwrap();
    let settings = ConfigManager::load_from_sources(temp_dir.path(), "test").unwrap();
    assert_eq!(
        settings.database.seed_path,
        Some(temp_dir.path().join("seed.json"))
    );

    let absolute = temp_dir.path().join("elsewhere").join("catalogue.json");
    fs::write(
        temp_dir.path().join("local.toml"),
        format!("[database]\nseed_path = {:?}\n", absolute.display().to_string()),
    )
    .unwrap();
    let settings = ConfigManager::load_from_sources(temp_dir.path(), "test").unwrap();
    assert_eq!(settings.database.seed_path, Some(absolute));
}
