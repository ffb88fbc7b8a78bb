use anyhow::Context;
use serde::Deserialize;

/// Cookie signing keys need at least this many bytes of secret material.
pub const MIN_SECRET_LEN: usize = 64;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub session: SessionConfig,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let secret = std::env::var("SESSION_SECRET").context("SESSION_SECRET must be set")?;
        anyhow::ensure!(
            secret.len() >= MIN_SECRET_LEN,
            "SESSION_SECRET must be at least {} bytes",
            MIN_SECRET_LEN
        );
        let session = SessionConfig {
            secret,
            cookie_secure: std::env::var("COOKIE_SECURE")
                .ok()
                .and_then(|v| v.parse::<bool>().ok())
                .unwrap_or(false),
        };
        Ok(Self {
            database_url,
            session,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
        })
    }

    /// In-memory database and a fixed secret; for tests and local experiments.
    pub fn ephemeral() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            session: SessionConfig {
                secret: "ephemeral-session-secret-".repeat(4),
                cookie_secure: false,
            },
            host: "127.0.0.1".into(),
            port: 0,
        }
    }
}
