//! Shared application state handed to every handler

use std::sync::Arc;
use tracing::warn;

use crate::config::Settings;
use crate::db::Database;
use crate::storage::BlobStore;
use crate::utils::auth::generate_random_string;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub blobs: Arc<dyn BlobStore>,
    pub settings: Arc<Settings>,
    jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(db: Database, blobs: Arc<dyn BlobStore>, settings: Settings) -> Self {
        let jwt_secret: Arc<str> = match settings.jwt_secret.as_deref() {
            Some(secret) if !secret.is_empty() => Arc::from(secret),
            _ => {
                warn!("No JWT secret configured; issued tokens will not survive a restart");
                Arc::from(generate_random_string(64).as_str())
            }
        };

        Self {
            db,
            blobs,
            settings: Arc::new(settings),
            jwt_secret,
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }
}
