//! Server settings
//!
//! Layered: defaults, then `releasehub.toml`, then `RELEASEHUB__*` env vars,
//! then the bare `DATABASE_URL` / `JWT_SECRET` / `PORT` variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::Paths;

/// Which blob backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobBackend {
    /// Files under the config dir, served at `/media`
    Local,
    /// Remote blob service reached over HTTP
    Http,
}

/// Blob storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobSettings {
    pub backend: BlobBackend,
    /// Storage root for the local backend (defaults to `<config>/blobs`)
    pub local_dir: Option<PathBuf>,
    /// Base URL the local backend builds public URLs from
    pub public_base_url: String,
    /// Endpoint of the remote blob service
    pub endpoint: Option<String>,
    /// Bearer token for the remote blob service
    pub token: Option<String>,
}

impl Default for BlobSettings {
    fn default() -> Self {
        Self {
            backend: BlobBackend::Local,
            local_dir: None,
            public_base_url: "http://localhost:4000/media".to_string(),
            endpoint: None,
            token: None,
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Host address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// sqlx connection string (defaults to a SQLite file in the config dir)
    pub database_url: Option<String>,

    /// HMAC secret for access tokens
    pub jwt_secret: Option<String>,

    /// Access token lifetime in seconds
    pub token_ttl_secs: u64,

    /// Largest accepted file part in bytes
    pub max_upload_bytes: usize,

    /// How long a release stays in PROCESSING before it is advanced
    pub processing_delay_secs: u64,

    /// Interval of the release processor sweep
    pub processing_sweep_secs: u64,

    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,

    pub blob: BlobSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            database_url: None,
            jwt_secret: None,
            token_ttl_secs: 7 * 24 * 3600,
            max_upload_bytes: 100 * 1024 * 1024,
            processing_delay_secs: 7,
            processing_sweep_secs: 5,
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ],
            blob: BlobSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings for the given config directory
    pub fn load(paths: &Paths) -> Result<Self> {
        let defaults = config::Config::try_from(&Settings::default())
            .context("Failed to serialize default settings")?;

        let layered = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(paths.settings_path()).required(false))
            .add_source(
                config::Environment::with_prefix("RELEASEHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database_url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("jwt_secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("port", std::env::var("PORT").ok())?
            .build()
            .context("Failed to read settings")?;

        let mut settings: Settings = layered
            .try_deserialize()
            .context("Failed to parse settings")?;

        if settings.database_url.is_none() {
            settings.database_url = Some(format!("sqlite:{}", paths.app_db_path().display()));
        }
        if settings.blob.local_dir.is_none() {
            settings.blob.local_dir = Some(paths.blobs_dir());
        }

        Ok(settings)
    }

    /// Connection string, falling back to an in-memory database
    pub fn database_url(&self) -> &str {
        self.database_url.as_deref().unwrap_or("sqlite::memory:")
    }
}
