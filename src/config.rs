//! Service configuration parsed from environment variables.
//!
//! `.env` is loaded by `main` before anything here runs. Optional
//! integrations (blob storage, language analytics, LLM) are represented as
//! `Option`s so the service starts without them and reports `Misconfigured`
//! per request instead.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DB_STATEMENT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_UPLOAD_CONTAINER: &str = "resumes";
pub const DEFAULT_UPLOAD_SAS_TTL_SECS: u64 = 3600;
pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Full connection URL. Takes precedence over the individual parts.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub require_tls: bool,
    pub max_connections: u32,
    pub connect_timeout: Duration,
    pub statement_timeout: Duration,
}

impl DbConfig {
    /// Read `DATABASE_URL` or the `DB_*` parts.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            url: env_opt("DATABASE_URL"),
            host: env_opt("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
            port: env_parse("DB_PORT", DEFAULT_DB_PORT),
            user: env_opt("DB_USER"),
            password: env_opt("DB_PASSWORD"),
            database: env_opt("DB_NAME"),
            require_tls: env_parse("DB_REQUIRE_TLS", true),
            max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            connect_timeout: Duration::from_secs(env_parse("DB_CONNECT_TIMEOUT_SECS", DEFAULT_DB_CONNECT_TIMEOUT_SECS)),
            statement_timeout: Duration::from_secs(env_parse(
                "DB_STATEMENT_TIMEOUT_SECS",
                DEFAULT_DB_STATEMENT_TIMEOUT_SECS,
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    pub connection_string: Option<String>,
    pub container: String,
    pub sas_ttl: Duration,
    pub max_bytes: usize,
}

impl UploadConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            connection_string: env_opt("AZURE_STORAGE_CONNECTION_STRING"),
            container: env_opt("UPLOAD_CONTAINER").unwrap_or_else(|| DEFAULT_UPLOAD_CONTAINER.to_string()),
            sas_ttl: Duration::from_secs(env_parse("UPLOAD_SAS_TTL_SECS", DEFAULT_UPLOAD_SAS_TTL_SECS)),
            max_bytes: env_parse("UPLOAD_MAX_BYTES", DEFAULT_UPLOAD_MAX_BYTES),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    pub endpoint: String,
    pub api_key: String,
}

impl LanguageConfig {
    /// `None` unless both `AZURE_LANGUAGE_ENDPOINT` and `AZURE_LANGUAGE_KEY` are set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let endpoint = env_opt("AZURE_LANGUAGE_ENDPOINT")?;
        let api_key = env_opt("AZURE_LANGUAGE_KEY")?;
        Some(Self { endpoint: endpoint.trim_end_matches('/').to_string(), api_key })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub db: DbConfig,
    pub upload: UploadConfig,
    pub language: Option<LanguageConfig>,
    pub catalog_path: Option<PathBuf>,
    pub static_dir: Option<PathBuf>,
}

impl AppConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT", DEFAULT_PORT),
            db: DbConfig::from_env(),
            upload: UploadConfig::from_env(),
            language: LanguageConfig::from_env(),
            catalog_path: env_opt("RECOMMENDATION_CATALOG_PATH").map(PathBuf::from),
            static_dir: env_opt("STATIC_DIR").map(PathBuf::from),
        }
    }
}

/// Read an env var, treating unset and blank the same.
pub(crate) fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
