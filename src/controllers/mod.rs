//! Controllers
//!
//! Este módulo contiene la capa entre los handlers HTTP y los repositorios:
//! validación de DTOs, mapeo a modelos de dominio y delegación al Selection
//! Manager para las operaciones de selección.

pub mod car_controller;
pub mod driver_controller;

pub use car_controller::CarController;
pub use driver_controller::DriverController;
