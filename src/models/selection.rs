//! Modelo de Selection
//!
//! Una fila driver_car enlaza un conductor con un coche. El flag 'selected'
//! indica si el enlace está activo; la fila se reutiliza en ciclos
//! posteriores de selección/deselección en lugar de borrarse.

use sqlx::FromRow;

use crate::models::car::Car;
use crate::models::driver::Driver;

/// Fila de la tabla driver_car. Como máximo una fila por par (car, driver);
/// como máximo una fila activa por coche entre todos los conductores.
#[derive(Debug, Clone, FromRow)]
pub struct Selection {
    pub id: i64,
    pub driver_id: i64,
    pub car_id: i64,
    pub selected: bool,
}

/// Fila de selección unida con su conductor y su coche, tal y como la
/// devuelve el listado filtrado.
#[derive(Debug, Clone)]
pub struct CarDriverPairing {
    pub selection: Selection,
    pub driver: Driver,
    pub car: Car,
}
