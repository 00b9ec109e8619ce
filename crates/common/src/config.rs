//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Uploaded file storage.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Outbound email (SMTP). Codes are only logged when absent.
    #[serde(default)]
    pub email: Option<EmailConfig>,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Blog settings.
    #[serde(default)]
    pub blog: BlogConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Local file storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory uploaded files are written to.
    #[serde(default = "default_storage_path")]
    pub base_path: PathBuf,
    /// URL prefix the files are served under.
    #[serde(default = "default_storage_url")]
    pub base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: default_storage_path(),
            base_url: default_storage_url(),
        }
    }
}

/// SMTP configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP relay host.
    pub smtp_host: String,
    /// SMTP port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub smtp_username: Option<String>,
    /// SMTP password.
    #[serde(default)]
    pub smtp_password: Option<String>,
    /// Use STARTTLS instead of implicit TLS.
    #[serde(default = "default_true")]
    pub starttls: bool,
    /// Sender mailbox, e.g. `Inkpost <noreply@example.com>`.
    pub from: String,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// How long an emailed verification code stays usable.
    #[serde(default = "default_captcha_ttl_minutes")]
    pub captcha_ttl_minutes: i64,
    /// Server-side lifetime of a session that was not "remembered".
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
    /// Mark the session cookie `Secure`.
    #[serde(default)]
    pub cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            captcha_ttl_minutes: default_captcha_ttl_minutes(),
            session_ttl_hours: default_session_ttl_hours(),
            cookie_secure: false,
        }
    }
}

/// Blog configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BlogConfig {
    /// Categories created at startup when missing.
    #[serde(default = "default_categories")]
    pub default_categories: Vec<String>,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            default_categories: default_categories(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./media")
}

fn default_storage_url() -> String {
    "/media".to_string()
}

const fn default_smtp_port() -> u16 {
    587
}

const fn default_true() -> bool {
    true
}

const fn default_captcha_ttl_minutes() -> i64 {
    10
}

const fn default_session_ttl_hours() -> i64 {
    24 * 14
}

fn default_categories() -> Vec<String> {
    ["Python", "Rust", "Web", "Life"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `INKPOST_ENV`)
    /// 3. Environment variables with `INKPOST_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("INKPOST_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("INKPOST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("INKPOST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Parse configuration from an inline TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_fills_defaults() {
        let raw = r#"
            [server]
            host = "127.0.0.1"

            [database]
            url = "postgres://localhost/inkpost"
        "#;

        let config = Config::from_toml_str(raw).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.storage.base_url, "/media");
        assert!(config.email.is_none());
        assert_eq!(config.auth.captcha_ttl_minutes, 10);
        assert_eq!(config.auth.session_ttl_hours, 336);
        assert!(!config.blog.default_categories.is_empty());
    }

    #[test]
    fn test_email_section() {
        let raw = r#"
            [server]
            port = 8080

            [database]
            url = "postgres://localhost/inkpost"

            [email]
            smtp_host = "smtp.example.com"
            from = "Inkpost <noreply@example.com>"
        "#;

        let config = Config::from_toml_str(raw).unwrap();

        let email = config.email.unwrap();
        assert_eq!(email.smtp_port, 587);
        assert!(email.starttls);
    }
}
