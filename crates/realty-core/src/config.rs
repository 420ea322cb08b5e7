use std::{
    env,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use config as cfg;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::locale::Locale;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseBackend {
    #[default]
    Memory,
    Rest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestConfig {
    /// Project URL of the hosted database (e.g. "https://xyz.supabase.co")
    #[serde(default)]
    pub url: String,
    /// Service key sent as `apikey` and bearer token
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,
    #[serde(default = "RestConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl RestConfig {
    fn default_timeout_secs() -> u64 {
        10
    }
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: None,
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: DatabaseBackend,
    #[serde(default)]
    pub rest: RestConfig,
    /// JSON seed loaded into the in-memory backend at startup
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default = "SecurityConfig::default_login_attempts")]
    pub login_attempts_per_minute: u32,
}

impl SecurityConfig {
    fn default_login_attempts() -> u32 {
        5
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            login_attempts_per_minute: Self::default_login_attempts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "AdminConfig::default_username")]
    pub username: String,
    /// Argon2 PHC string; the admin panel is disabled while unset.
    #[serde(default, skip_serializing)]
    pub password_hash: Option<SecretString>,
    #[serde(default = "AdminConfig::default_token_ttl")]
    pub token_ttl_minutes: i64,
}

impl AdminConfig {
    fn default_username() -> String {
        "admin".to_string()
    }

    fn default_token_ttl() -> i64 {
        8 * 60
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: Self::default_username(),
            password_hash: None,
            token_ttl_minutes: Self::default_token_ttl(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SecretsConfig {
    // Do not serialize secrets; allow deserialization from config/env only.
    #[serde(default, skip_serializing)]
    pub jwt_secret: Option<SecretString>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SiteConfig {
    #[serde(default)]
    pub default_locale: Locale,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "Settings::default_env")]
    pub env: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub secrets: SecretsConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            env: Self::default_env(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            security: SecurityConfig::default(),
            admin: AdminConfig::default(),
            secrets: SecretsConfig::default(),
            site: SiteConfig::default(),
        }
    }
}

impl Settings {
    fn default_env() -> String {
        env::var("APP_ENV")
            .ok()
            .or_else(|| env::var("RUST_ENV").ok())
            .unwrap_or_else(|| "development".to_string())
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.server.host.trim().is_empty(),
            "server.host cannot be empty"
        );
        anyhow::ensure!(self.server.port > 0, "server.port must be > 0");
        anyhow::ensure!(
            self.security.login_attempts_per_minute > 0,
            "security.login_attempts_per_minute must be > 0"
        );

        if self.database.backend == DatabaseBackend::Rest {
            anyhow::ensure!(
                !self.database.rest.url.trim().is_empty(),
                "database.rest.url cannot be empty when backend = rest"
            );
            anyhow::ensure!(
                self.database.rest.api_key.is_some(),
                "database.rest.api_key must be set when backend = rest"
            );
        }

        if self.admin.password_hash.is_some() {
            let secret_len = self
                .secrets
                .jwt_secret
                .as_ref()
                .map(|s| s.expose_secret().len())
                .unwrap_or(0);
            anyhow::ensure!(
                secret_len >= 32,
                "secrets.jwt_secret must be at least 32 bytes when the admin panel is enabled"
            );
            anyhow::ensure!(
                self.admin.token_ttl_minutes > 0,
                "admin.token_ttl_minutes must be > 0"
            );
        }

        Ok(())
    }

    pub fn admin_enabled(&self) -> bool {
        self.admin.password_hash.is_some()
    }
}

#[derive(Debug)]
pub struct ConfigManager {
    settings: Arc<Settings>,
    config_dir: PathBuf,
    env: String,
}

impl ConfigManager {
    /// Loads settings from `config_dir` (or the default directory) for the
    /// given environment and validates them.
    pub fn new(config_dir: Option<PathBuf>, env_override: Option<String>) -> Result<Self> {
        let env_name = env_override.unwrap_or_else(Settings::default_env);
        let config_dir = config_dir.unwrap_or_else(Self::default_config_dir);
        let settings = Self::load_from_sources(&config_dir, &env_name)?;
        settings.validate()?;
        info!(env = %env_name, dir = ?config_dir, "Configuration loaded");
        Ok(Self {
            settings: Arc::new(settings),
            config_dir,
            env: env_name,
        })
    }

    pub fn settings(&self) -> Arc<Settings> {
        self.settings.clone()
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn env(&self) -> &str {
        &self.env
    }

    /// `./config/` when it exists, otherwise the current directory.
    pub fn default_config_dir() -> PathBuf {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let project_config = cwd.join("config");
        if project_config.exists() {
            project_config
        } else {
            cwd
        }
    }

    /// Layers `default.toml`, `{env}.toml`, `local.toml` and `REALTY__*`
    /// environment variables, later sources winning.
    pub fn load_from_sources(config_dir: &Path, env_name: &str) -> Result<Settings> {
        let builder = cfg::Config::builder()
            .add_source(cfg::File::from(config_dir.join("default.toml")).required(false))
            .add_source(
                cfg::File::from(config_dir.join(format!("{}.toml", env_name))).required(false),
            )
            .add_source(cfg::File::from(config_dir.join("local.toml")).required(false))
            .add_source(
                cfg::Environment::with_prefix("REALTY")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("security.allowed_origins")
                    .try_parsing(true),
            )
            .set_override("env", env_name)?;

        let mut settings: Settings = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        settings.database.seed_path = settings
            .database
            .seed_path
            .map(|path| resolve_relative(config_dir, path));
        Ok(settings)
    }
}

/// Relative file paths in settings are taken from the config directory, not
/// the working directory.
fn resolve_relative(config_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_relative() {
        config_dir.join(path)
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        settings.validate().unwrap();
        assert_eq!(settings.database.backend, DatabaseBackend::Memory);
        assert_eq!(settings.site.default_locale, Locale::Cs);
        assert!(!settings.admin_enabled());
    }

    #[test]
    fn rest_backend_needs_url_and_key() {
        let mut settings = Settings::default();
        settings.database.backend = DatabaseBackend::Rest;
        assert!(settings.validate().is_err());
        settings.database.rest.url = "https://db.example.com".into();
        assert!(settings.validate().is_err());
        settings.database.rest.api_key = Some(SecretString::from("service-key".to_string()));
        settings.validate().unwrap();
    }

    #[test]
    fn admin_requires_strong_jwt_secret() {
        let mut settings = Settings::default();
        settings.admin.password_hash = Some(SecretString::from("$argon2id$...".to_string()));
        settings.secrets.jwt_secret = Some(SecretString::from("short".to_string()));
        assert!(settings.validate().is_err());
        settings.secrets.jwt_secret = Some(SecretString::from("x".repeat(32)));
        settings.validate().unwrap();
    }

    #[test]
    fn secrets_are_not_serialized() {
        let mut settings = Settings::default();
        settings.secrets.jwt_secret = Some(SecretString::from("x".repeat(32)));
        let rendered = toml::to_string(&settings).unwrap();
        assert!(!rendered.contains("xxxx"));
        assert!(!rendered.contains("jwt_secret"));
    }
}
