use serde::Serialize;

use crate::dto::car_dto::CarResponse;
use crate::dto::driver_dto::DriverResponse;
use crate::models::selection::{CarDriverPairing, Selection};

// Response de una selección: el contrato externo son los dos ids y el flag
#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub driver_id: i64,
    pub car_id: i64,
    pub selected: bool,
}

impl SelectionResponse {
    pub fn from_model(selection: &Selection) -> Self {
        Self {
            driver_id: selection.driver_id,
            car_id: selection.car_id,
            selected: selection.selected,
        }
    }
}

// Fila del listado de búsqueda: selección con conductor y coche embebidos
#[derive(Debug, Serialize)]
pub struct CarDriverResponse {
    pub driver: DriverResponse,
    pub car: CarResponse,
    pub selected: bool,
}

impl CarDriverResponse {
    pub fn from_pairing(pairing: &CarDriverPairing) -> Self {
        Self {
            driver: DriverResponse::from_model(&pairing.driver),
            car: CarResponse::from_model(&pairing.car),
            selected: pairing.selection.selected,
        }
    }
}

// Página de resultados
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
}
