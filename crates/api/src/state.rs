use std::sync::Arc;

use plug_core::schema::SchemaRegistry;
use plug_core::uploads::UploadStore;
use plug_db::repositories::{EntityRepo, LookupRepo};
use plug_db::store::RecordStore;
use plug_events::EventBus;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything heavy is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (health check).
    pub pool: plug_db::DbPool,
    /// Record store the repositories run statements through.
    pub store: Arc<dyn RecordStore>,
    /// Immutable entity catalog.
    pub registry: Arc<SchemaRegistry>,
    pub config: Arc<ServerConfig>,
    /// Event bus for approval notifications.
    pub event_bus: Arc<EventBus>,
    pub uploads: Arc<dyn UploadStore>,
}

impl AppState {
    pub fn entities(&self) -> EntityRepo<'_> {
        EntityRepo::new(self.store.as_ref(), &self.registry)
    }

    pub fn lookups(&self) -> LookupRepo<'_> {
        LookupRepo::new(self.store.as_ref(), &self.registry)
    }
}
