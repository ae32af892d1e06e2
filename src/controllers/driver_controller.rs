use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use bcrypt::{hash, DEFAULT_COST};
use validator::Validate;

use crate::config::environment::EnvironmentConfig;
use crate::dto::driver_dto::{ApiResponse, CreateDriverRequest, DriverResponse};
use crate::dto::selection_dto::{CarDriverResponse, PageResponse, SelectionResponse};
use crate::models::driver::OnlineStatus;
use crate::repositories::DriverRepository;
use crate::services::SelectionService;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, validation_error, AppError, AppResult};
use crate::utils::validation::{validate_coordinates, validate_non_negative};

pub struct DriverController {
    config: EnvironmentConfig,
    drivers: Arc<dyn DriverRepository>,
    selections: SelectionService,
}

impl DriverController {
    pub fn new(state: &AppState) -> Self {
        Self {
            config: state.config.clone(),
            drivers: state.drivers.clone(),
            selections: state.selections.clone(),
        }
    }

    pub async fn create(
        &self,
        request: CreateDriverRequest,
    ) -> AppResult<ApiResponse<DriverResponse>> {
        request.validate()?;

        // La contraseña nunca se guarda en claro
        let password_hash = hash(&request.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))?;

        let driver = self.drivers.create(&request.username, &password_hash).await?;

        Ok(ApiResponse::success_with_message(
            DriverResponse::from_model(&driver),
            "Conductor registrado exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<DriverResponse> {
        check_id(id, "driver_id")?;

        let driver = self
            .drivers
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("driver", id))?;

        Ok(DriverResponse::from_model(&driver))
    }

    pub async fn find_by_status(&self, raw_status: &str) -> AppResult<Vec<DriverResponse>> {
        let status = OnlineStatus::from_str(raw_status).map_err(|_| {
            AppError::InvalidFilter(format!(
                "'{}' is not a valid value for 'online_status'",
                raw_status
            ))
        })?;

        let drivers = self.drivers.find_by_online_status(status).await?;

        Ok(drivers.iter().map(DriverResponse::from_model).collect())
    }

    pub async fn update_location(
        &self,
        id: i64,
        longitude: f64,
        latitude: f64,
    ) -> AppResult<DriverResponse> {
        check_id(id, "driver_id")?;
        validate_coordinates(latitude, longitude)
            .map_err(|_| validation_error("coordinate", "coordinates out of range"))?;

        let driver = self
            .drivers
            .update_location(id, longitude, latitude)
            .await?
            .ok_or_else(|| not_found_error("driver", id))?;

        Ok(DriverResponse::from_model(&driver))
    }

    pub async fn update_status(
        &self,
        id: i64,
        raw_status: &str,
    ) -> AppResult<DriverResponse> {
        check_id(id, "driver_id")?;
        let status = OnlineStatus::from_str(raw_status).map_err(|_| {
            AppError::InvalidFilter(format!(
                "'{}' is not a valid value for 'online_status'",
                raw_status
            ))
        })?;

        let driver = self
            .drivers
            .update_online_status(id, status)
            .await?
            .ok_or_else(|| not_found_error("driver", id))?;

        Ok(DriverResponse::from_model(&driver))
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        check_id(id, "driver_id")?;

        if !self.drivers.delete(id).await? {
            return Err(not_found_error("driver", id));
        }
        Ok(())
    }

    pub async fn select_car(
        &self,
        driver_id: i64,
        car_id: i64,
    ) -> AppResult<ApiResponse<SelectionResponse>> {
        check_id(driver_id, "driver_id")?;
        check_id(car_id, "car_id")?;

        let selection = self
            .selections
            .select_car_for_driver(driver_id, car_id)
            .await?;

        Ok(ApiResponse::success(SelectionResponse::from_model(&selection)))
    }

    pub async fn deselect_car(
        &self,
        driver_id: i64,
        car_id: i64,
    ) -> AppResult<ApiResponse<SelectionResponse>> {
        check_id(driver_id, "driver_id")?;
        check_id(car_id, "car_id")?;

        let selection = self
            .selections
            .deselect_car_for_driver(driver_id, car_id)
            .await?;

        Ok(ApiResponse::success(SelectionResponse::from_model(&selection)))
    }

    pub async fn find_selection(
        &self,
        driver_id: i64,
        car_id: i64,
    ) -> AppResult<ApiResponse<SelectionResponse>> {
        check_id(driver_id, "driver_id")?;
        check_id(car_id, "car_id")?;

        match self.selections.find(driver_id, car_id).await? {
            Some(selection) => Ok(ApiResponse::success(SelectionResponse::from_model(&selection))),
            None => Ok(ApiResponse::empty_with_message(
                "No selection exists for this driver and car".to_string(),
            )),
        }
    }

    /// Búsqueda paginada de pares conductor-coche. 'page' y 'page_size' se
    /// extraen antes de interpretar el resto como filtros.
    pub async fn search(
        &self,
        mut params: HashMap<String, String>,
    ) -> AppResult<PageResponse<CarDriverResponse>> {
        let page = take_page_param(&mut params, "page", 0)?;
        let page_size = take_page_param(&mut params, "page_size", self.config.default_page_size)?
            .min(self.config.max_page_size)
            .max(1);

        let (pairings, total) = self
            .selections
            .find_car_drivers(&params, page, page_size)
            .await?;

        Ok(PageResponse {
            items: pairings.iter().map(CarDriverResponse::from_pairing).collect(),
            page,
            page_size,
            total,
        })
    }
}

fn check_id(id: i64, field: &'static str) -> AppResult<()> {
    validate_non_negative(id).map_err(|_| validation_error(field, "must be a non-negative id"))
}

fn take_page_param(
    params: &mut HashMap<String, String>,
    key: &str,
    default: u32,
) -> AppResult<u32> {
    match params.remove(key) {
        Some(raw) => raw.parse::<u32>().map_err(|_| {
            AppError::InvalidFilter(format!("'{}' is not a valid value for '{}'", raw, key))
        }),
        None => Ok(default),
    }
}
