//! Repositorios de acceso a datos
//!
//! Este módulo define los contratos de acceso al almacenamiento (traits por
//! entidad) y sus implementaciones: Postgres para producción y un backend en
//! memoria para los tests.

pub mod car_repository;
pub mod driver_repository;
pub mod memory;
pub mod selection_repository;

pub use car_repository::{CarRepository, PgCarRepository};
pub use driver_repository::{DriverRepository, PgDriverRepository};
pub use selection_repository::{PgSelectionRepository, SelectionRepository};
