//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::{
    CarRepository, DriverRepository, PgCarRepository, PgDriverRepository,
    PgSelectionRepository, SelectionRepository,
};
use crate::services::SelectionService;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub drivers: Arc<dyn DriverRepository>,
    pub cars: Arc<dyn CarRepository>,
    pub selections: SelectionService,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        drivers: Arc<dyn DriverRepository>,
        cars: Arc<dyn CarRepository>,
        selection_store: Arc<dyn SelectionRepository>,
    ) -> Self {
        let selections = SelectionService::new(drivers.clone(), cars.clone(), selection_store);
        Self {
            config,
            drivers,
            cars,
            selections,
        }
    }

    /// Estado respaldado por PostgreSQL, el backend de producción.
    pub fn postgres(pool: PgPool, config: EnvironmentConfig) -> Self {
        Self::new(
            config,
            Arc::new(PgDriverRepository::new(pool.clone())),
            Arc::new(PgCarRepository::new(pool.clone())),
            Arc::new(PgSelectionRepository::new(pool)),
        )
    }
}
