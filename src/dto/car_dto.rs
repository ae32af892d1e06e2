use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::car::{Car, CarStatus};

// Request para dar de alta un coche
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCarRequest {
    #[validate(custom = "crate::utils::validation::validate_license_plate")]
    pub license_plate: String,
    #[serde(default)]
    pub convertible: bool,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f32>,
    pub engine_type: Option<String>,
    pub manufacturer: Option<String>,
}

// Request para actualizar un coche: todos los campos editables se
// sobreescriben, no hay actualización parcial.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCarRequest {
    #[validate(custom = "crate::utils::validation::validate_license_plate")]
    pub license_plate: String,
    #[serde(default)]
    pub convertible: bool,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f32>,
    pub engine_type: Option<String>,
    pub manufacturer: Option<String>,
}

// Response de coche
#[derive(Debug, Serialize)]
pub struct CarResponse {
    pub id: i64,
    pub license_plate: String,
    pub convertible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    pub car_status: CarStatus,
}

impl CarResponse {
    pub fn from_model(car: &Car) -> Self {
        Self {
            id: car.id,
            license_plate: car.license_plate.clone(),
            convertible: car.convertible,
            rating: car.rating,
            engine_type: car.engine_type.clone(),
            manufacturer: car.manufacturer.clone(),
            car_status: car.car_status,
        }
    }
}
