//! Connection pool construction for the `sqlx::Any` driver.
//!
//! The pool is built lazily: no connection is opened until the first request
//! needs one, so the service starts even when the database is down and each
//! request reports connectivity failures on its own.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use url::Url;

/// Storage engines the SQL in this crate is written for (`?` placeholders,
/// driver-reported last insert id).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    MySql,
    Sqlite,
}

impl Backend {
    /// Detect the backend from the URL scheme.
    pub fn detect(dsn: &str) -> Result<Self> {
        let raw = dsn.trim();
        if raw.is_empty() {
            return Err(anyhow!("Database URL not configured"));
        }
        let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database URL: {e}"))?;
        match url.scheme() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(anyhow!("Unsupported database type: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_conns: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_conns: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Build a lazily-connecting pool for `dsn`.
pub fn connect_lazy(dsn: &str, settings: &PoolSettings) -> Result<AnyPool> {
    let backend = Backend::detect(dsn)?;
    sqlx::any::install_default_drivers();

    // "mariadb://" is a config-side alias; the driver only knows "mysql://".
    let dsn = match backend {
        Backend::MySql => dsn.trim().replacen("mariadb://", "mysql://", 1),
        Backend::Sqlite => dsn.trim().to_string(),
    };

    AnyPoolOptions::new()
        .max_connections(settings.max_conns)
        .acquire_timeout(settings.acquire_timeout)
        .connect_lazy(&dsn)
        .with_context(|| format!("Failed to configure {backend:?} connection pool"))
}
