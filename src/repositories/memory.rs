//! Backend de almacenamiento en memoria
//!
//! Implementa los mismos contratos que el backend Postgres, incluida la
//! unicidad de username, matrícula y par (car, driver). Lo usa la suite de
//! tests; no requiere base de datos.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::car::{Car, CarStatus};
use crate::models::driver::{Driver, OnlineStatus};
use crate::models::selection::{CarDriverPairing, Selection};
use crate::repositories::{CarRepository, DriverRepository, SelectionRepository};
use crate::services::selection_search::SelectionFilter;
use crate::utils::errors::{AppError, AppResult};

#[derive(Default)]
struct Tables {
    drivers: HashMap<i64, Driver>,
    cars: HashMap<i64, Car>,
    selections: HashMap<i64, Selection>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserta una fila driver_car directamente, sin pasar por el Selection
    /// Manager. Solo para fixtures de test (p. ej. estados corruptos).
    pub async fn seed_selection(&self, driver_id: i64, car_id: i64, selected: bool) -> Selection {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let selection = Selection {
            id,
            driver_id,
            car_id,
            selected,
        };
        tables.selections.insert(id, selection.clone());
        selection
    }
}

#[async_trait]
impl DriverRepository for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Driver>> {
        let tables = self.tables.read().await;
        Ok(tables.drivers.get(&id).filter(|d| !d.deleted).cloned())
    }

    async fn create(&self, username: &str, password_hash: &str) -> AppResult<Driver> {
        let mut tables = self.tables.write().await;
        // La unicidad de username cubre también a los conductores borrados,
        // igual que la constraint de la tabla.
        if tables.drivers.values().any(|d| d.username == username) {
            return Err(AppError::ConstraintViolation(format!(
                "driver with username '{}' already exists",
                username
            )));
        }

        let id = tables.next_id();
        let driver = Driver {
            id,
            username: username.to_string(),
            password: password_hash.to_string(),
            online_status: OnlineStatus::Offline,
            longitude: None,
            latitude: None,
            deleted: false,
            date_created: Utc::now(),
        };
        tables.drivers.insert(id, driver.clone());
        Ok(driver)
    }

    async fn find_by_online_status(&self, status: OnlineStatus) -> AppResult<Vec<Driver>> {
        let tables = self.tables.read().await;
        let mut drivers: Vec<Driver> = tables
            .drivers
            .values()
            .filter(|d| !d.deleted && d.online_status == status)
            .cloned()
            .collect();
        drivers.sort_by_key(|d| d.id);
        Ok(drivers)
    }

    async fn update_location(
        &self,
        id: i64,
        longitude: f64,
        latitude: f64,
    ) -> AppResult<Option<Driver>> {
        let mut tables = self.tables.write().await;
        match tables.drivers.get_mut(&id).filter(|d| !d.deleted) {
            Some(driver) => {
                driver.longitude = Some(longitude);
                driver.latitude = Some(latitude);
                Ok(Some(driver.clone()))
            }
            None => Ok(None),
        }
    }

    async fn update_online_status(
        &self,
        id: i64,
        status: OnlineStatus,
    ) -> AppResult<Option<Driver>> {
        let mut tables = self.tables.write().await;
        match tables.drivers.get_mut(&id).filter(|d| !d.deleted) {
            Some(driver) => {
                driver.online_status = status;
                Ok(Some(driver.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.drivers.get_mut(&id).filter(|d| !d.deleted) {
            Some(driver) => {
                driver.deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl CarRepository for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Car>> {
        let tables = self.tables.read().await;
        Ok(tables
            .cars
            .get(&id)
            .filter(|c| c.car_status == CarStatus::Active)
            .cloned())
    }

    async fn create(
        &self,
        license_plate: &str,
        convertible: bool,
        rating: Option<f32>,
        engine_type: Option<&str>,
        manufacturer: Option<&str>,
    ) -> AppResult<Car> {
        let mut tables = self.tables.write().await;
        if tables.cars.values().any(|c| c.license_plate == license_plate) {
            return Err(AppError::ConstraintViolation(format!(
                "car with license plate '{}' already exists",
                license_plate
            )));
        }

        let id = tables.next_id();
        let car = Car {
            id,
            license_plate: license_plate.to_string(),
            convertible,
            rating,
            engine_type: engine_type.map(str::to_string),
            manufacturer: manufacturer.map(str::to_string),
            car_status: CarStatus::Active,
            date_created: Utc::now(),
        };
        tables.cars.insert(id, car.clone());
        Ok(car)
    }

    async fn find_all(&self) -> AppResult<Vec<Car>> {
        let tables = self.tables.read().await;
        let mut cars: Vec<Car> = tables
            .cars
            .values()
            .filter(|c| c.car_status == CarStatus::Active)
            .cloned()
            .collect();
        cars.sort_by(|a, b| b.date_created.cmp(&a.date_created).then(b.id.cmp(&a.id)));
        Ok(cars)
    }

    async fn update(
        &self,
        id: i64,
        license_plate: &str,
        convertible: bool,
        rating: Option<f32>,
        engine_type: Option<&str>,
        manufacturer: Option<&str>,
    ) -> AppResult<Option<Car>> {
        let mut tables = self.tables.write().await;
        if tables
            .cars
            .values()
            .any(|c| c.id != id && c.license_plate == license_plate)
        {
            return Err(AppError::ConstraintViolation(format!(
                "car with license plate '{}' already exists",
                license_plate
            )));
        }

        match tables
            .cars
            .get_mut(&id)
            .filter(|c| c.car_status == CarStatus::Active)
        {
            Some(car) => {
                car.license_plate = license_plate.to_string();
                car.convertible = convertible;
                car.rating = rating;
                car.engine_type = engine_type.map(str::to_string);
                car.manufacturer = manufacturer.map(str::to_string);
                Ok(Some(car.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        match tables
            .cars
            .get_mut(&id)
            .filter(|c| c.car_status == CarStatus::Active)
        {
            Some(car) => {
                car.car_status = CarStatus::Deleted;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl SelectionRepository for InMemoryStore {
    async fn find_by_pair(&self, driver_id: i64, car_id: i64) -> AppResult<Option<Selection>> {
        let tables = self.tables.read().await;
        Ok(tables
            .selections
            .values()
            .find(|s| s.driver_id == driver_id && s.car_id == car_id)
            .cloned())
    }

    async fn find_active_for_car(&self, car_id: i64) -> AppResult<Vec<Selection>> {
        let tables = self.tables.read().await;
        let mut selections: Vec<Selection> = tables
            .selections
            .values()
            .filter(|s| s.car_id == car_id && s.selected)
            .cloned()
            .collect();
        selections.sort_by_key(|s| s.id);
        Ok(selections)
    }

    async fn create(&self, driver_id: i64, car_id: i64, selected: bool) -> AppResult<Selection> {
        let mut tables = self.tables.write().await;
        if tables
            .selections
            .values()
            .any(|s| s.driver_id == driver_id && s.car_id == car_id)
        {
            return Err(AppError::ConstraintViolation(format!(
                "selection for driver {} and car {} already exists",
                driver_id, car_id
            )));
        }
        // Las referencias son obligatorias, como las foreign keys de la tabla.
        if !tables.drivers.contains_key(&driver_id) || !tables.cars.contains_key(&car_id) {
            return Err(AppError::ConstraintViolation(format!(
                "selection references missing driver {} or car {}",
                driver_id, car_id
            )));
        }

        let id = tables.next_id();
        let selection = Selection {
            id,
            driver_id,
            car_id,
            selected,
        };
        tables.selections.insert(id, selection.clone());
        Ok(selection)
    }

    async fn set_selected(&self, id: i64, selected: bool) -> AppResult<Selection> {
        let mut tables = self.tables.write().await;
        match tables.selections.get_mut(&id) {
            Some(selection) => {
                selection.selected = selected;
                Ok(selection.clone())
            }
            None => Err(AppError::EntityNotFound(format!(
                "Could not find selection with id: {}",
                id
            ))),
        }
    }

    async fn list(
        &self,
        filter: &SelectionFilter,
        page: u32,
        page_size: u32,
    ) -> AppResult<(Vec<CarDriverPairing>, i64)> {
        let tables = self.tables.read().await;

        let mut selections: Vec<&Selection> = tables.selections.values().collect();
        selections.sort_by_key(|s| s.id);

        let mut matched = Vec::new();
        for selection in selections {
            let driver = match tables.drivers.get(&selection.driver_id) {
                Some(d) if !d.deleted => d,
                _ => continue,
            };
            let car = match tables.cars.get(&selection.car_id) {
                Some(c) if c.car_status == CarStatus::Active => c,
                _ => continue,
            };
            if filter.matches(driver, car) {
                matched.push(CarDriverPairing {
                    selection: selection.clone(),
                    driver: driver.clone(),
                    car: car.clone(),
                });
            }
        }

        let total = matched.len() as i64;
        let start = page as usize * page_size as usize;
        let items = matched
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect();

        Ok((items, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_username_is_a_constraint_violation() {
        let store = InMemoryStore::new();
        DriverRepository::create(&store, "driver01", "hash").await.unwrap();

        let result = DriverRepository::create(&store, "driver01", "other").await;
        assert!(matches!(result, Err(AppError::ConstraintViolation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_pair_is_a_constraint_violation() {
        let store = InMemoryStore::new();
        let driver = DriverRepository::create(&store, "driver01", "hash").await.unwrap();
        let car = CarRepository::create(&store, "AB-123-CD", false, None, None, None)
            .await
            .unwrap();

        SelectionRepository::create(&store, driver.id, car.id, false)
            .await
            .unwrap();
        let result = SelectionRepository::create(&store, driver.id, car.id, true).await;
        assert!(matches!(result, Err(AppError::ConstraintViolation(_))));
    }

    #[tokio::test]
    async fn test_soft_deleted_car_is_excluded_from_lookups() {
        let store = InMemoryStore::new();
        let car = CarRepository::create(&store, "AB-123-CD", false, None, None, None)
            .await
            .unwrap();

        assert!(CarRepository::delete(&store, car.id).await.unwrap());
        assert!(CarRepository::find_by_id(&store, car.id).await.unwrap().is_none());
        assert!(CarRepository::find_all(&store).await.unwrap().is_empty());
        // segundo borrado: la fila ya no está activa
        assert!(!CarRepository::delete(&store, car.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_excludes_rows_of_deleted_entities() {
        let store = InMemoryStore::new();
        let driver = DriverRepository::create(&store, "driver01", "hash").await.unwrap();
        let car = CarRepository::create(&store, "AB-123-CD", false, None, None, None)
            .await
            .unwrap();
        store.seed_selection(driver.id, car.id, true).await;

        let (items, total) = SelectionRepository::list(&store, &SelectionFilter::default(), 0, 20)
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(items.len(), 1);

        DriverRepository::delete(&store, driver.id).await.unwrap();
        let (items, total) = SelectionRepository::list(&store, &SelectionFilter::default(), 0, 20)
            .await
            .unwrap();
        assert_eq!(total, 0);
        assert!(items.is_empty());
    }
}
