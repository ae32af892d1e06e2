use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};

use crate::controllers::car_controller::CarController;
use crate::dto::car_dto::{CarResponse, CreateCarRequest, UpdateCarRequest};
use crate::dto::driver_dto::ApiResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_car_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_car))
        .route("/", get(list_cars))
        .route("/:car_id", get(get_car))
        .route("/:car_id", put(update_car))
        .route("/:car_id", delete(delete_car))
}

async fn create_car(
    State(state): State<AppState>,
    Json(request): Json<CreateCarRequest>,
) -> Result<Json<ApiResponse<CarResponse>>, AppError> {
    let controller = CarController::new(&state);
    let response = controller.create(request).await?;
    Ok(Json(response))
}

async fn get_car(
    State(state): State<AppState>,
    Path(car_id): Path<i64>,
) -> Result<Json<CarResponse>, AppError> {
    let controller = CarController::new(&state);
    let response = controller.get_by_id(car_id).await?;
    Ok(Json(response))
}

async fn list_cars(
    State(state): State<AppState>,
) -> Result<Json<Vec<CarResponse>>, AppError> {
    let controller = CarController::new(&state);
    let response = controller.list().await?;
    Ok(Json(response))
}

async fn update_car(
    State(state): State<AppState>,
    Path(car_id): Path<i64>,
    Json(request): Json<UpdateCarRequest>,
) -> Result<Json<ApiResponse<CarResponse>>, AppError> {
    let controller = CarController::new(&state);
    let response = controller.update(car_id, request).await?;
    Ok(Json(response))
}

async fn delete_car(
    State(state): State<AppState>,
    Path(car_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = CarController::new(&state);
    controller.delete(car_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Coche eliminado exitosamente"
    })))
}
