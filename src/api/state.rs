use std::sync::Arc;

use crate::storage::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Bearer token for `/api/admin`; admin is disabled when unset
    pub admin_token: Option<String>,
    pub cors_origin: String,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            admin_token: None,
            cors_origin: "*".to_string(),
        }
    }

    pub fn with_admin_token(mut self, token: Option<String>) -> Self {
        self.admin_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_cors_origin(mut self, origin: String) -> Self {
        self.cors_origin = origin;
        self
    }
}
