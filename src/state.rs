use crate::{
    config::AppConfig,
    services::{catalog_service::CatalogService, search_service::SearchService},
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub search: SearchService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Arc<SqlitePool>, config: AppConfig) -> Self {
        Self {
            catalog: CatalogService::new(db.clone()),
            search: SearchService::new(db),
            config: Arc::new(config),
        }
    }
}
