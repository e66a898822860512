use std::path::PathBuf;
use std::time::Duration;

use plug_db::DatabaseConfig;

use crate::auth::jwt::JwtConfig;

/// Startup configuration failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// The single dashboard credential.
#[derive(Debug, Clone)]
pub struct AdminCredential {
    pub username: String,
    /// Argon2id PHC string.
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory blobs are written to and served from under `/uploads`.
    pub dir: PathBuf,
    pub max_bytes: usize,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub database: DatabaseConfig,
    pub admin: AdminCredential,
    pub jwt: JwtConfig,
    pub uploads: UploadConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `DATABASE_URL`            | required                |
    /// | `DB_MAX_CONNECTIONS`      | `10`                    |
    /// | `DB_ACQUIRE_TIMEOUT_SECS` | `5`                     |
    /// | `ADMIN_USERNAME`          | `admin`                 |
    /// | `ADMIN_PASSWORD_HASH`     | required                |
    /// | `JWT_SECRET`              | required                |
    /// | `JWT_EXPIRY_MINS`         | `480`                   |
    /// | `UPLOAD_DIR`              | `./uploads`             |
    /// | `UPLOAD_MAX_BYTES`        | `10485760`              |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &'static str, default: &str| get(key).unwrap_or_else(|| default.into());
        let required = |key: &'static str| {
            get(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let cors_origins = var("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let password_hash = required("ADMIN_PASSWORD_HASH")?;
        if !password_hash.starts_with("$argon2") {
            return Err(ConfigError::Invalid {
                var: "ADMIN_PASSWORD_HASH",
                value: "<redacted>".into(),
                reason: "expected an Argon2 PHC string".into(),
            });
        }

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port: parse("PORT", var("PORT", "3000"))?,
            cors_origins,
            request_timeout_secs: parse("REQUEST_TIMEOUT_SECS", var("REQUEST_TIMEOUT_SECS", "30"))?,
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parse("DB_MAX_CONNECTIONS", var("DB_MAX_CONNECTIONS", "10"))?,
                acquire_timeout: Duration::from_secs(parse(
                    "DB_ACQUIRE_TIMEOUT_SECS",
                    var("DB_ACQUIRE_TIMEOUT_SECS", "5"),
                )?),
            },
            admin: AdminCredential {
                username: var("ADMIN_USERNAME", "admin"),
                password_hash,
            },
            jwt: JwtConfig {
                secret: required("JWT_SECRET")?,
                expiry_mins: parse("JWT_EXPIRY_MINS", var("JWT_EXPIRY_MINS", "480"))?,
            },
            uploads: UploadConfig {
                dir: PathBuf::from(var("UPLOAD_DIR", "./uploads")),
                max_bytes: parse("UPLOAD_MAX_BYTES", var("UPLOAD_MAX_BYTES", "10485760"))?,
            },
        })
    }
}

fn parse<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value.trim().parse() {
        Ok(parsed) => Ok(parsed),
        Err(e) => Err(ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}
