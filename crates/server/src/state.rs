use std::sync::Arc;

use sqlx::SqlitePool;

use cineteca_metadata::provider::MetadataProvider;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub provider: Arc<dyn MetadataProvider>,
}
