//! Modelo de Car
//!
//! Este módulo contiene el struct Car y su estado de ciclo de vida.
//! El borrado es lógico: la fila nunca se elimina, solo cambia car_status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

/// Estado del coche - mapea al ENUM car_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "car_status")]
pub enum CarStatus {
    #[sqlx(rename = "ACTIVE")]
    #[serde(rename = "ACTIVE")]
    Active,
    #[sqlx(rename = "DELETED")]
    #[serde(rename = "DELETED")]
    Deleted,
}

/// Car principal - mapea exactamente a la tabla car
#[derive(Debug, Clone, FromRow)]
pub struct Car {
    pub id: i64,
    pub license_plate: String,
    pub convertible: bool,
    pub rating: Option<f32>,
    pub engine_type: Option<String>,
    pub manufacturer: Option<String>,
    pub car_status: CarStatus,
    pub date_created: DateTime<Utc>,
}
