use std::sync::Arc;

use crate::infrastructure::{config::Config, store::TodoStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn TodoStore>,
}

impl AppState {
    pub fn new(config: Arc<Config>, store: Arc<dyn TodoStore>) -> Self {
        Self { config, store }
    }

    pub fn is_ready(&self) -> bool {
        self.store.is_connected()
    }
}
