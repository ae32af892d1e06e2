use std::sync::Arc;

use validator::Validate;

use crate::dto::car_dto::{CarResponse, CreateCarRequest, UpdateCarRequest};
use crate::dto::driver_dto::ApiResponse;
use crate::repositories::CarRepository;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, validation_error, AppResult};
use crate::utils::validation::{validate_non_negative, validate_not_empty};

pub struct CarController {
    cars: Arc<dyn CarRepository>,
}

impl CarController {
    pub fn new(state: &AppState) -> Self {
        Self {
            cars: state.cars.clone(),
        }
    }

    pub async fn create(
        &self,
        request: CreateCarRequest,
    ) -> AppResult<ApiResponse<CarResponse>> {
        if validate_not_empty(&request.license_plate).is_err() {
            return Err(validation_error("license_plate", "license plate is required"));
        }
        request.validate()?;

        let car = self
            .cars
            .create(
                &request.license_plate,
                request.convertible,
                request.rating,
                request.engine_type.as_deref(),
                request.manufacturer.as_deref(),
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            CarResponse::from_model(&car),
            "Coche creado exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<CarResponse> {
        check_id(id)?;

        let car = self
            .cars
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("car", id))?;

        Ok(CarResponse::from_model(&car))
    }

    pub async fn list(&self) -> AppResult<Vec<CarResponse>> {
        let cars = self.cars.find_all().await?;

        Ok(cars.iter().map(CarResponse::from_model).collect())
    }

    pub async fn update(
        &self,
        id: i64,
        request: UpdateCarRequest,
    ) -> AppResult<ApiResponse<CarResponse>> {
        check_id(id)?;
        request.validate()?;

        let car = self
            .cars
            .update(
                id,
                &request.license_plate,
                request.convertible,
                request.rating,
                request.engine_type.as_deref(),
                request.manufacturer.as_deref(),
            )
            .await?
            .ok_or_else(|| not_found_error("car", id))?;

        Ok(ApiResponse::success_with_message(
            CarResponse::from_model(&car),
            "Coche actualizado exitosamente".to_string(),
        ))
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        check_id(id)?;

        if !self.cars.delete(id).await? {
            return Err(not_found_error("car", id));
        }
        Ok(())
    }
}

fn check_id(id: i64) -> AppResult<()> {
    validate_non_negative(id)
        .map_err(|_| validation_error("car_id", "must be a non-negative id"))
}
