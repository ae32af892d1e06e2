//! Selection Manager
//!
//! Máquina de estados de la selección de coches: como máximo un conductor
//! puede tener un coche activamente seleccionado en cada momento. La
//! secuencia leer-decidir-escribir de select/deselect se serializa por coche
//! con un lock asíncrono; la constraint de unicidad (car, driver) de la
//! tabla queda como segunda línea de defensa.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error};

use crate::models::selection::{CarDriverPairing, Selection};
use crate::repositories::{CarRepository, DriverRepository, SelectionRepository};
use crate::services::selection_search::SelectionFilter;
use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Un lock por coche. El registro crece con la flota y las entradas no se
/// liberan; cada entrada es un mutex de unas decenas de bytes.
#[derive(Clone, Default)]
struct CarLockRegistry {
    locks: Arc<RwLock<HashMap<i64, Arc<Mutex<()>>>>>,
}

impl CarLockRegistry {
    async fn lock_for(&self, car_id: i64) -> Arc<Mutex<()>> {
        {
            let locks = self.locks.read().await;
            if let Some(lock) = locks.get(&car_id) {
                return lock.clone();
            }
        }

        let mut locks = self.locks.write().await;
        locks
            .entry(car_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[derive(Clone)]
pub struct SelectionService {
    drivers: Arc<dyn DriverRepository>,
    cars: Arc<dyn CarRepository>,
    selections: Arc<dyn SelectionRepository>,
    car_locks: CarLockRegistry,
}

impl SelectionService {
    pub fn new(
        drivers: Arc<dyn DriverRepository>,
        cars: Arc<dyn CarRepository>,
        selections: Arc<dyn SelectionRepository>,
    ) -> Self {
        Self {
            drivers,
            cars,
            selections,
            car_locks: CarLockRegistry::default(),
        }
    }

    /// Seleccionar un coche para un conductor. Reintentar la selección del
    /// mismo par es idempotente; si otro conductor tiene el coche activo la
    /// operación falla sin tocar el estado.
    pub async fn select_car_for_driver(
        &self,
        driver_id: i64,
        car_id: i64,
    ) -> AppResult<Selection> {
        debug!("selecting car {} for driver {}", car_id, driver_id);

        self.check_driver_exists(driver_id).await?;
        self.check_car_exists(car_id).await?;

        let lock = self.car_locks.lock_for(car_id).await;
        let _guard = lock.lock().await;

        match self.active_selection_for_car(car_id).await? {
            Some(active) if active.driver_id != driver_id => {
                Err(AppError::CarAlreadyInUse(car_id))
            }
            _ => self.mark_pair_selected(driver_id, car_id).await,
        }
    }

    /// Deseleccionar un coche. La fila del par no se borra: el flag vuelve a
    /// false y la fila queda lista para el siguiente ciclo.
    pub async fn deselect_car_for_driver(
        &self,
        driver_id: i64,
        car_id: i64,
    ) -> AppResult<Selection> {
        debug!("deselecting car {} for driver {}", car_id, driver_id);

        self.check_driver_exists(driver_id).await?;
        self.check_car_exists(car_id).await?;

        let lock = self.car_locks.lock_for(car_id).await;
        let _guard = lock.lock().await;

        match self.active_selection_for_car(car_id).await? {
            Some(active) if active.driver_id == driver_id => {
                self.selections.set_selected(active.id, false).await
            }
            _ => Err(AppError::EntityNotFound(format!(
                "Car {} is not currently selected by driver {}",
                car_id, driver_id
            ))),
        }
    }

    /// Búsqueda directa de la fila del par. La ausencia es un resultado
    /// normal, no un error: el caller decide qué significa "sin relación".
    pub async fn find(&self, driver_id: i64, car_id: i64) -> AppResult<Option<Selection>> {
        self.selections.find_by_pair(driver_id, car_id).await
    }

    /// Listado paginado de pares conductor-coche bajo un filtro dinámico.
    pub async fn find_car_drivers(
        &self,
        params: &HashMap<String, String>,
        page: u32,
        page_size: u32,
    ) -> AppResult<(Vec<CarDriverPairing>, i64)> {
        let filter = SelectionFilter::from_params(params)?;
        self.selections.list(&filter, page, page_size).await
    }

    /// La fila activa del coche, si existe. Más de una fila activa es un
    /// fallo de consistencia interna: se reporta como error genérico y no se
    /// enmascara, porque indica un defecto de serialización de escrituras.
    async fn active_selection_for_car(&self, car_id: i64) -> AppResult<Option<Selection>> {
        let active = self.selections.find_active_for_car(car_id).await?;

        if active.len() > 1 {
            error!(
                "❌ car {} has {} active selections, expected at most one",
                car_id,
                active.len()
            );
            return Err(AppError::Internal(format!(
                "car {} has more than one active selection",
                car_id
            )));
        }

        Ok(active.into_iter().next())
    }

    async fn mark_pair_selected(&self, driver_id: i64, car_id: i64) -> AppResult<Selection> {
        match self.selections.find_by_pair(driver_id, car_id).await? {
            Some(existing) => self.selections.set_selected(existing.id, true).await,
            None => {
                debug!("first selection of car {} by driver {}", car_id, driver_id);
                self.selections.create(driver_id, car_id, true).await
            }
        }
    }

    async fn check_driver_exists(&self, driver_id: i64) -> AppResult<()> {
        self.drivers
            .find_by_id(driver_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| not_found_error("driver", driver_id))
    }

    async fn check_car_exists(&self, car_id: i64) -> AppResult<()> {
        self.cars
            .find_by_id(car_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| not_found_error("car", car_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::car::Car;
    use crate::models::driver::Driver;
    use crate::repositories::memory::InMemoryStore;

    fn service_over(store: &Arc<InMemoryStore>) -> SelectionService {
        SelectionService::new(store.clone(), store.clone(), store.clone())
    }

    async fn add_driver(store: &InMemoryStore, username: &str) -> Driver {
        DriverRepository::create(store, username, "hash").await.unwrap()
    }

    async fn add_car(store: &InMemoryStore, license_plate: &str) -> Car {
        CarRepository::create(store, license_plate, false, None, None, None)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_select_creates_an_active_selection() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_over(&store);
        let driver = add_driver(&store, "driver01").await;
        let car = add_car(&store, "AB-123-CD").await;

        let selection = service
            .select_car_for_driver(driver.id, car.id)
            .await
            .unwrap();

        assert_eq!(selection.driver_id, driver.id);
        assert_eq!(selection.car_id, car.id);
        assert!(selection.selected);
    }

    #[tokio::test]
    async fn test_select_is_idempotent_for_the_same_driver() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_over(&store);
        let driver = add_driver(&store, "driver01").await;
        let car = add_car(&store, "AB-123-CD").await;

        let first = service
            .select_car_for_driver(driver.id, car.id)
            .await
            .unwrap();
        let second = service
            .select_car_for_driver(driver.id, car.id)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert!(second.selected);

        let active = SelectionRepository::find_active_for_car(store.as_ref(), car.id)
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
    }

    #[tokio::test]
    async fn test_select_fails_when_another_driver_holds_the_car() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_over(&store);
        let first = add_driver(&store, "driver01").await;
        let second = add_driver(&store, "driver02").await;
        let car = add_car(&store, "AB-123-CD").await;

        service
            .select_car_for_driver(first.id, car.id)
            .await
            .unwrap();
        let result = service.select_car_for_driver(second.id, car.id).await;

        assert!(matches!(result, Err(AppError::CarAlreadyInUse(id)) if id == car.id));

        // la selección del primer conductor queda intacta
        let active = SelectionRepository::find_active_for_car(store.as_ref(), car.id)
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].driver_id, first.id);
    }

    #[tokio::test]
    async fn test_select_requires_existing_driver_and_car() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_over(&store);
        let driver = add_driver(&store, "driver01").await;
        let car = add_car(&store, "AB-123-CD").await;

        let result = service.select_car_for_driver(9999, car.id).await;
        assert!(matches!(result, Err(AppError::EntityNotFound(_))));

        let result = service.select_car_for_driver(driver.id, 9999).await;
        assert!(matches!(result, Err(AppError::EntityNotFound(_))));
    }

    #[tokio::test]
    async fn test_select_fails_on_soft_deleted_car() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_over(&store);
        let driver = add_driver(&store, "driver01").await;
        let car = add_car(&store, "AB-123-CD").await;
        CarRepository::delete(store.as_ref(), car.id).await.unwrap();

        let result = service.select_car_for_driver(driver.id, car.id).await;
        assert!(matches!(result, Err(AppError::EntityNotFound(_))));
    }

    #[tokio::test]
    async fn test_deselect_flips_the_flag_and_keeps_the_row() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_over(&store);
        let driver = add_driver(&store, "driver01").await;
        let car = add_car(&store, "AB-123-CD").await;

        service
            .select_car_for_driver(driver.id, car.id)
            .await
            .unwrap();
        let deselected = service
            .deselect_car_for_driver(driver.id, car.id)
            .await
            .unwrap();
        assert!(!deselected.selected);

        // la fila sobrevive al ciclo completo con el flag apagado
        let found = service.find(driver.id, car.id).await.unwrap();
        let selection = found.expect("row must survive deselection");
        assert!(!selection.selected);
        assert_eq!(selection.id, deselected.id);
    }

    #[tokio::test]
    async fn test_deselect_fails_when_not_held_by_this_driver() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_over(&store);
        let first = add_driver(&store, "driver01").await;
        let second = add_driver(&store, "driver02").await;
        let car = add_car(&store, "AB-123-CD").await;

        // nadie lo tiene seleccionado
        let result = service.deselect_car_for_driver(first.id, car.id).await;
        assert!(matches!(result, Err(AppError::EntityNotFound(_))));

        // lo tiene otro conductor
        service
            .select_car_for_driver(first.id, car.id)
            .await
            .unwrap();
        let result = service.deselect_car_for_driver(second.id, car.id).await;
        assert!(matches!(result, Err(AppError::EntityNotFound(_))));

        // y el coche sigue en manos del primer conductor
        let active = SelectionRepository::find_active_for_car(store.as_ref(), car.id)
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].driver_id, first.id);
    }

    #[tokio::test]
    async fn test_car_changes_hands_after_deselection() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_over(&store);
        let first = add_driver(&store, "driver01").await;
        let second = add_driver(&store, "driver02").await;
        let car = add_car(&store, "AB-123-CD").await;

        let selection = service
            .select_car_for_driver(first.id, car.id)
            .await
            .unwrap();
        assert!(selection.selected);

        let result = service.select_car_for_driver(second.id, car.id).await;
        assert!(matches!(result, Err(AppError::CarAlreadyInUse(_))));

        let released = service
            .deselect_car_for_driver(first.id, car.id)
            .await
            .unwrap();
        assert!(!released.selected);

        let taken = service
            .select_car_for_driver(second.id, car.id)
            .await
            .unwrap();
        assert_eq!(taken.driver_id, second.id);
        assert!(taken.selected);

        let active = SelectionRepository::find_active_for_car(store.as_ref(), car.id)
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].driver_id, second.id);
    }

    #[tokio::test]
    async fn test_find_returns_none_for_unrelated_pair() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_over(&store);
        let driver = add_driver(&store, "driver01").await;
        let car = add_car(&store, "AB-123-CD").await;

        let found = service.find(driver.id, car.id).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_more_than_one_active_selection_is_fatal() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_over(&store);
        let first = add_driver(&store, "driver01").await;
        let second = add_driver(&store, "driver02").await;
        let third = add_driver(&store, "driver03").await;
        let car = add_car(&store, "AB-123-CD").await;

        // estado corrupto: dos filas activas para el mismo coche
        store.seed_selection(first.id, car.id, true).await;
        store.seed_selection(second.id, car.id, true).await;

        let result = service.select_car_for_driver(third.id, car.id).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_concurrent_selects_have_exactly_one_winner() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_over(&store);
        let first = add_driver(&store, "driver01").await;
        let second = add_driver(&store, "driver02").await;
        let car = add_car(&store, "AB-123-CD").await;

        let (r1, r2) = tokio::join!(
            service.select_car_for_driver(first.id, car.id),
            service.select_car_for_driver(second.id, car.id),
        );

        assert!(r1.is_ok() != r2.is_ok(), "exactly one select may win");
        let loser = if r1.is_ok() { r2 } else { r1 };
        assert!(matches!(loser, Err(AppError::CarAlreadyInUse(_))));

        let active = SelectionRepository::find_active_for_car(store.as_ref(), car.id)
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
    }

    #[tokio::test]
    async fn test_find_car_drivers_applies_filters() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_over(&store);
        let driver = add_driver(&store, "driver01").await;
        let audi = CarRepository::create(
            store.as_ref(),
            "AB-123-CD",
            true,
            Some(4.5),
            Some("ELECTRIC"),
            Some("Audi"),
        )
        .await
        .unwrap();
        let bmw = CarRepository::create(
            store.as_ref(),
            "XY-987-ZW",
            false,
            Some(4.0),
            Some("GAS"),
            Some("BMW"),
        )
        .await
        .unwrap();

        service
            .select_car_for_driver(driver.id, audi.id)
            .await
            .unwrap();
        service.deselect_car_for_driver(driver.id, audi.id).await.unwrap();
        service
            .select_car_for_driver(driver.id, bmw.id)
            .await
            .unwrap();

        let mut params = HashMap::new();
        params.insert("manufacturer".to_string(), "Audi".to_string());
        params.insert("convertible".to_string(), "true".to_string());

        // el listado incluye filas no activas: filtra por atributos, no por flag
        let (items, total) = service.find_car_drivers(&params, 0, 20).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].car.id, audi.id);
        assert!(!items[0].selection.selected);
    }

    #[tokio::test]
    async fn test_find_car_drivers_rejects_invalid_filter() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_over(&store);

        let mut params = HashMap::new();
        params.insert("onlineStatus".to_string(), "bogus".to_string());

        let result = service.find_car_drivers(&params, 0, 20).await;
        assert!(matches!(result, Err(AppError::InvalidFilter(_))));
    }

    #[tokio::test]
    async fn test_find_car_drivers_paginates() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_over(&store);
        let driver = add_driver(&store, "driver01").await;
        for i in 0..5 {
            let car = add_car(&store, &format!("AB-{:03}-CD", i)).await;
            service
                .select_car_for_driver(driver.id, car.id)
                .await
                .unwrap();
            service
                .deselect_car_for_driver(driver.id, car.id)
                .await
                .unwrap();
        }

        let params = HashMap::new();
        let (first_page, total) = service.find_car_drivers(&params, 0, 2).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(first_page.len(), 2);

        let (last_page, _) = service.find_car_drivers(&params, 2, 2).await.unwrap();
        assert_eq!(last_page.len(), 1);

        let (beyond, _) = service.find_car_drivers(&params, 3, 2).await.unwrap();
        assert!(beyond.is_empty());
    }
}
