//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sqlx::error::ErrorKind;
use thiserror::Error;
use tracing::{error, warn};

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Car with id {0} is already selected by another driver")]
    CarAlreadyInUse(i64),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Respuesta de error para la API: código numérico + mensaje
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Database(e) => {
                error!("❌ Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred while accessing the database".to_string(),
                )
            }

            AppError::Validation(e) => {
                warn!("Validation error: {}", e);
                (StatusCode::BAD_REQUEST, format!("Invalid request data: {}", e))
            }

            AppError::EntityNotFound(msg) => {
                warn!("Entity not found: {}", msg);
                (StatusCode::NOT_FOUND, msg)
            }

            AppError::CarAlreadyInUse(car_id) => {
                warn!("Car {} already in use", car_id);
                (
                    StatusCode::CONFLICT,
                    format!(
                        "Car with id {} is already selected by another driver. Please select another car instead.",
                        car_id
                    ),
                )
            }

            AppError::ConstraintViolation(msg) => {
                warn!("Constraint violation: {}", msg);
                (StatusCode::BAD_REQUEST, format!("Constraint violation: {}", msg))
            }

            AppError::InvalidFilter(msg) => {
                warn!("Invalid filter: {}", msg);
                (StatusCode::BAD_REQUEST, format!("Invalid filter: {}", msg))
            }

            AppError::Internal(msg) => {
                error!("❌ Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            status: status.as_u16(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Traducir errores de sqlx: las violaciones de constraints (unique, not-null,
/// foreign key) se reportan al caller como ConstraintViolation; el resto queda
/// como error de base de datos.
pub fn translate_db_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db) = e {
        match db.kind() {
            ErrorKind::UniqueViolation
            | ErrorKind::ForeignKeyViolation
            | ErrorKind::NotNullViolation
            | ErrorKind::CheckViolation => {
                return AppError::ConstraintViolation(db.message().to_string());
            }
            _ => {}
        }
    }
    AppError::Database(e)
}

/// Función helper para crear errores de validación
pub fn validation_error(field: &'static str, message: &'static str) -> AppError {
    use validator::ValidationError;

    let mut error = ValidationError::new("custom");
    error.add_param("field".into(), &field);
    error.add_param("message".into(), &message);

    let mut errors = validator::ValidationErrors::new();
    errors.add(field, error);

    AppError::Validation(errors)
}

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: i64) -> AppError {
    AppError::EntityNotFound(format!("Could not find {} with id: {}", resource, id))
}
