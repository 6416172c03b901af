//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured for local development.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Deployment environment. Controls whether raw error detail is echoed
/// back to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
    Test,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            "test" | "testing" => Ok(Environment::Test),
            other => Err(ConfigError::Invalid {
                name: "APP_ENV",
                value: other.to_string(),
            }),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// sqlx connection string for the contacts database
    pub database_url: String,
    /// Directory backing the local attachment disk
    pub storage_root: PathBuf,
    /// URL prefix under which stored attachments are served
    pub storage_public_url: String,
    /// Allowed CORS origin (localhost is always allowed)
    pub cors_origin: String,
    /// Page size used when `perPage` is not supplied
    pub default_per_page: u32,
    /// Compare `email1` case-insensitively when checking uniqueness
    pub email_unique_case_insensitive: bool,
    /// Request body cap; must exceed the attachment cap so oversize uploads
    /// reach the validator
    pub max_body_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: parse_var("PORT", 8080)?,
            environment: env::var("APP_ENV")
                .map(|v| v.parse())
                .unwrap_or(Ok(Environment::Development))?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://contacts.db?mode=rwc".to_string()),
            storage_root: env::var("STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./uploads")),
            storage_public_url: env::var("STORAGE_PUBLIC_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "/uploads".to_string()),
            cors_origin: env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            default_per_page: parse_var("DEFAULT_PER_PAGE", 20)?,
            email_unique_case_insensitive: parse_var("EMAIL_UNIQUE_CASE_INSENSITIVE", false)?,
            max_body_bytes: parse_var("MAX_BODY_BYTES", 10 * 1024 * 1024)?,
        })
    }

    /// Config for tests: in-memory database, test environment.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            environment: Environment::Test,
            database_url: "sqlite::memory:".to_string(),
            storage_root: PathBuf::from("./uploads"),
            storage_public_url: "/uploads".to_string(),
            cors_origin: "http://localhost:3000".to_string(),
            default_per_page: 20,
            email_unique_case_insensitive: false,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
