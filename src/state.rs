use crate::storage::LedgerStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<LedgerStore>,
}

impl AppState {
    pub fn new(store: LedgerStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}
