//! Rutas de la API
//!
//! Este módulo monta los routers por entidad bajo /api y aplica las capas
//! de CORS y trazado de requests.

pub mod car_routes;
pub mod driver_routes;

use axum::{response::Json, routing::get, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::middleware::cors::{cors_middleware, cors_middleware_with_origins};
use crate::state::AppState;

pub fn create_api_router(state: AppState) -> Router {
    let cors = if state.config.is_development() || state.config.cors_origins.is_empty() {
        cors_middleware()
    } else {
        cors_middleware_with_origins(state.config.cors_origins.clone())
    };

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/driver", driver_routes::create_driver_router())
        .nest("/api/car", car_routes::create_car_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check simple
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "service": "fleet-pairing",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
