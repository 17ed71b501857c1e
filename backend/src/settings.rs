//! Service configuration loaded via OrthoConfig.
//!
//! Values layer from CLI flags, `HIPPO_*` environment variables and config
//! files. Accessors apply defaults and report missing required values.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use zeroize::Zeroizing;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Errors raised when settings are missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A required value was not supplied.
    #[error("missing required setting: {key}")]
    Missing { key: &'static str },
    /// The bind address did not parse as `host:port`.
    #[error("invalid bind address: {value}")]
    InvalidBindAddr { value: String },
}

/// Runtime configuration for the lending service.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HIPPO")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Shared key expected in the `X-Api-Key` header.
    pub api_key: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Seconds to wait for a pooled connection before failing the request.
    pub db_connect_timeout_secs: Option<u64>,
    /// Apply embedded migrations at startup.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("db_max_connections", &self.db_max_connections)
            .field("db_connect_timeout_secs", &self.db_connect_timeout_secs)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

impl AppSettings {
    /// Listen address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|_| SettingsError::InvalidBindAddr {
            value: raw.to_owned(),
        })
    }

    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::Missing {
                key: "database_url",
            })
    }

    /// The API key, wiped from memory when the returned value drops.
    pub fn api_key(&self) -> Result<Zeroizing<String>, SettingsError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .map(|key| Zeroizing::new(key.to_owned()))
            .ok_or(SettingsError::Missing { key: "api_key" })
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .filter(|max| *max > 0)
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Pool checkout timeout, defaulting to 30 seconds.
    pub fn db_connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.db_connect_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_DB_CONNECT_TIMEOUT_SECS),
        )
    }
}
