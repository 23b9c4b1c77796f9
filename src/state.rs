//! Shared application state for all routes.

use crate::store::StoreHandle;

#[derive(Clone)]
pub struct AppState {
    pub store: StoreHandle,
}

impl AppState {
    pub fn new(store: StoreHandle) -> Self {
        AppState { store }
    }
}
