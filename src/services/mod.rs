//! Services module
//!
//! Este módulo contiene la lógica de negocio de la selección de coches:
//! la máquina de estados del Selection Manager y el filtro de búsqueda
//! sobre pares conductor-coche.

pub mod selection_search;
pub mod selection_service;

pub use selection_search::SelectionFilter;
pub use selection_service::SelectionService;
