//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::VehicleStore;
use crate::services::token_verifier::TokenVerifier;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn VehicleStore>,
    pub config: EnvironmentConfig,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn VehicleStore>,
        config: EnvironmentConfig,
        verifier: Arc<TokenVerifier>,
    ) -> Self {
        Self {
            store,
            config,
            verifier,
        }
    }
}
