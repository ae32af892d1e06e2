use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};

use crate::controllers::driver_controller::DriverController;
use crate::dto::driver_dto::{
    ApiResponse, CreateDriverRequest, DriverResponse, FindDriversQuery, UpdateLocationQuery,
    UpdateStatusQuery,
};
use crate::dto::selection_dto::{CarDriverResponse, PageResponse, SelectionResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_driver))
        .route("/", get(find_drivers))
        .route("/search", get(search_car_drivers))
        .route("/:driver_id", get(get_driver))
        .route("/:driver_id", delete(delete_driver))
        .route("/:driver_id/location", put(update_location))
        .route("/:driver_id/status", put(update_status))
        .route("/:driver_id/selected-cars/:car_id", put(select_car))
        .route("/:driver_id/selected-cars/:car_id", get(get_selection))
        .route("/:driver_id/selected-cars/:car_id", delete(deselect_car))
}

async fn create_driver(
    State(state): State<AppState>,
    Json(request): Json<CreateDriverRequest>,
) -> Result<Json<ApiResponse<DriverResponse>>, AppError> {
    let controller = DriverController::new(&state);
    let response = controller.create(request).await?;
    Ok(Json(response))
}

async fn get_driver(
    State(state): State<AppState>,
    Path(driver_id): Path<i64>,
) -> Result<Json<DriverResponse>, AppError> {
    let controller = DriverController::new(&state);
    let response = controller.get_by_id(driver_id).await?;
    Ok(Json(response))
}

async fn find_drivers(
    State(state): State<AppState>,
    Query(query): Query<FindDriversQuery>,
) -> Result<Json<Vec<DriverResponse>>, AppError> {
    let controller = DriverController::new(&state);
    let response = controller.find_by_status(&query.online_status).await?;
    Ok(Json(response))
}

async fn delete_driver(
    State(state): State<AppState>,
    Path(driver_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = DriverController::new(&state);
    controller.delete(driver_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Conductor eliminado exitosamente"
    })))
}

async fn update_location(
    State(state): State<AppState>,
    Path(driver_id): Path<i64>,
    Query(query): Query<UpdateLocationQuery>,
) -> Result<Json<DriverResponse>, AppError> {
    let controller = DriverController::new(&state);
    let response = controller
        .update_location(driver_id, query.longitude, query.latitude)
        .await?;
    Ok(Json(response))
}

async fn update_status(
    State(state): State<AppState>,
    Path(driver_id): Path<i64>,
    Query(query): Query<UpdateStatusQuery>,
) -> Result<Json<DriverResponse>, AppError> {
    let controller = DriverController::new(&state);
    let response = controller
        .update_status(driver_id, &query.online_status)
        .await?;
    Ok(Json(response))
}

async fn select_car(
    State(state): State<AppState>,
    Path((driver_id, car_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<SelectionResponse>>, AppError> {
    let controller = DriverController::new(&state);
    let response = controller.select_car(driver_id, car_id).await?;
    Ok(Json(response))
}

async fn deselect_car(
    State(state): State<AppState>,
    Path((driver_id, car_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<SelectionResponse>>, AppError> {
    let controller = DriverController::new(&state);
    let response = controller.deselect_car(driver_id, car_id).await?;
    Ok(Json(response))
}

async fn get_selection(
    State(state): State<AppState>,
    Path((driver_id, car_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<SelectionResponse>>, AppError> {
    let controller = DriverController::new(&state);
    let response = controller.find_selection(driver_id, car_id).await?;
    Ok(Json(response))
}

async fn search_car_drivers(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<PageResponse<CarDriverResponse>>, AppError> {
    let controller = DriverController::new(&state);
    let response = controller.search(params).await?;
    Ok(Json(response))
}
