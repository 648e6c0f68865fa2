use std::sync::Arc;

use crate::{
    db::CatalogStore,
    services::{CatalogService, IdentityProvider},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        identity: Arc<dyn IdentityProvider>,
        page_size: u32,
        activity_page_size: u32,
    ) -> Self {
        Self {
            catalog: CatalogService::new(store, page_size, activity_page_size),
            identity,
        }
    }
}
