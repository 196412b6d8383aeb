// src/state.rs

use std::{sync::Arc, time::Duration};

use axum::extract::FromRef;

use crate::{config::Config, engine::controller::SessionController, store::Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Config,
    pub sessions: SessionController,
}

impl AppState {
    /// Wires the store into a fresh session controller.
    pub fn new(store: Store, config: Config) -> Self {
        let sessions = SessionController::new(
            Arc::new(store.clone()),
            Duration::from_millis(config.tick_interval_ms.max(1)),
        );
        Self {
            store,
            config,
            sessions,
        }
    }
}

impl FromRef<AppState> for Store {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for SessionController {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}
