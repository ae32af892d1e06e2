use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::driver::{Driver, OnlineStatus};

// Request para registrar un conductor
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDriverRequest {
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

// Query para listar conductores por estado
#[derive(Debug, Deserialize)]
pub struct FindDriversQuery {
    pub online_status: String,
}

// Query para actualizar la última posición conocida
#[derive(Debug, Deserialize)]
pub struct UpdateLocationQuery {
    pub longitude: f64,
    pub latitude: f64,
}

// Query para cambiar el estado online
#[derive(Debug, Deserialize)]
pub struct UpdateStatusQuery {
    pub online_status: String,
}

#[derive(Debug, Serialize)]
pub struct CoordinateResponse {
    pub longitude: f64,
    pub latitude: f64,
}

// Response de conductor (sin password)
#[derive(Debug, Serialize)]
pub struct DriverResponse {
    pub id: i64,
    pub username: String,
    pub online_status: OnlineStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<CoordinateResponse>,
}

impl DriverResponse {
    pub fn from_model(driver: &Driver) -> Self {
        let coordinate = match (driver.longitude, driver.latitude) {
            (Some(longitude), Some(latitude)) => Some(CoordinateResponse {
                longitude,
                latitude,
            }),
            _ => None,
        };

        Self {
            id: driver.id,
            username: driver.username.clone(),
            online_status: driver.online_status,
            coordinate,
        }
    }
}

// Response genérica
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: Some(data),
        }
    }

    pub fn empty_with_message(message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: None,
        }
    }
}
