// SPDX-License-Identifier: Apache-2.0

use crate::config::ServerConfig;
use curbmap_api::ApiError;
use curbmap_provider::PlaceSource;
use curbmap_query::Geofence;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    pub provider: Arc<dyn PlaceSource>,
    pub geofence: Arc<Geofence>,
    pub default_limit: u64,
    pub max_limit: u64,
}

impl AppState {
    #[must_use]
    pub fn new(conn: Connection, provider: Arc<dyn PlaceSource>, cfg: &ServerConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            provider,
            geofence: Arc::new(cfg.region.geofence()),
            default_limit: cfg.default_limit,
            max_limit: cfg.max_limit,
        }
    }

    /// Runs store work on a blocking thread with the connection held. The
    /// closure maps its own engine errors; everything that fails around it
    /// becomes the generic internal error.
    pub(crate) async fn with_db<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, ApiError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let conn = db.lock().map_err(|e| {
                error!(error = %e, "connection mutex poisoned");
                ApiError::internal()
            })?;
            f(&conn)
        })
        .await
        .map_err(|e| {
            error!(error = %e, "blocking store task failed");
            ApiError::internal()
        })?
    }
}
