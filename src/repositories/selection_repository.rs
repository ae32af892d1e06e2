use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use crate::models::car::Car;
use crate::models::driver::Driver;
use crate::models::selection::{CarDriverPairing, Selection};
use crate::services::selection_search::SelectionFilter;
use crate::utils::errors::{translate_db_error, AppResult};

/// Acceso a la tabla driver_car. La fila de un par (driver, car) se crea una
/// sola vez; los ciclos posteriores de selección solo cambian el flag.
#[async_trait]
pub trait SelectionRepository: Send + Sync {
    async fn find_by_pair(&self, driver_id: i64, car_id: i64) -> AppResult<Option<Selection>>;

    /// Todas las filas con selected = TRUE para un coche, entre todos los
    /// conductores.
    async fn find_active_for_car(&self, car_id: i64) -> AppResult<Vec<Selection>>;

    async fn create(&self, driver_id: i64, car_id: i64, selected: bool) -> AppResult<Selection>;

    async fn set_selected(&self, id: i64, selected: bool) -> AppResult<Selection>;

    /// Listado paginado de pares (selección + conductor + coche) que cumplen
    /// todos los filtros presentes. Devuelve la página y el total de filas
    /// que cumplen el filtro.
    async fn list(
        &self,
        filter: &SelectionFilter,
        page: u32,
        page_size: u32,
    ) -> AppResult<(Vec<CarDriverPairing>, i64)>;
}

pub struct PgSelectionRepository {
    pool: PgPool,
}

impl PgSelectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Traducir el filtro tipado a condiciones SQL sobre el join.
    fn apply_filter<'a>(qb: &mut QueryBuilder<'a, Postgres>, filter: &SelectionFilter) {
        if let Some(username) = &filter.username {
            qb.push(" AND d.username LIKE ");
            qb.push_bind(format!("%{}%", username));
        }
        if let Some(status) = filter.online_status {
            qb.push(" AND d.online_status = ");
            qb.push_bind(status);
        }
        if let Some(license_plate) = &filter.license_plate {
            qb.push(" AND c.license_plate LIKE ");
            qb.push_bind(format!("%{}%", license_plate));
        }
        if let Some(convertible) = filter.convertible {
            qb.push(" AND c.convertible = ");
            qb.push_bind(convertible);
        }
        if let Some(rating) = filter.rating {
            qb.push(" AND c.rating = ");
            qb.push_bind(rating);
        }
        if let Some(engine_type) = &filter.engine_type {
            qb.push(" AND c.engine_type = ");
            qb.push_bind(engine_type.clone());
        }
        if let Some(manufacturer) = &filter.manufacturer {
            qb.push(" AND c.manufacturer LIKE ");
            qb.push_bind(format!("%{}%", manufacturer));
        }
    }
}

#[async_trait]
impl SelectionRepository for PgSelectionRepository {
    async fn find_by_pair(&self, driver_id: i64, car_id: i64) -> AppResult<Option<Selection>> {
        let selection = sqlx::query_as::<_, Selection>(
            "SELECT * FROM driver_car WHERE driver_id = $1 AND car_id = $2",
        )
        .bind(driver_id)
        .bind(car_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(selection)
    }

    async fn find_active_for_car(&self, car_id: i64) -> AppResult<Vec<Selection>> {
        let selections = sqlx::query_as::<_, Selection>(
            "SELECT * FROM driver_car WHERE car_id = $1 AND selected = TRUE ORDER BY id",
        )
        .bind(car_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(selections)
    }

    async fn create(&self, driver_id: i64, car_id: i64, selected: bool) -> AppResult<Selection> {
        let selection = sqlx::query_as::<_, Selection>(
            r#"
            INSERT INTO driver_car (driver_id, car_id, selected)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(driver_id)
        .bind(car_id)
        .bind(selected)
        .fetch_one(&self.pool)
        .await
        .map_err(translate_db_error)?;

        Ok(selection)
    }

    async fn set_selected(&self, id: i64, selected: bool) -> AppResult<Selection> {
        let selection = sqlx::query_as::<_, Selection>(
            "UPDATE driver_car SET selected = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(selected)
        .fetch_one(&self.pool)
        .await
        .map_err(translate_db_error)?;

        Ok(selection)
    }

    async fn list(
        &self,
        filter: &SelectionFilter,
        page: u32,
        page_size: u32,
    ) -> AppResult<(Vec<CarDriverPairing>, i64)> {
        let mut count_qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT COUNT(*) \
             FROM driver_car s \
             JOIN driver d ON d.id = s.driver_id \
             JOIN car c ON c.id = s.car_id \
             WHERE d.deleted = FALSE AND c.car_status = 'ACTIVE'",
        );
        Self::apply_filter(&mut count_qb, filter);

        let total: i64 = count_qb.build().fetch_one(&self.pool).await?.try_get(0)?;

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT s.id AS selection_id, s.driver_id, s.car_id, s.selected, \
             d.username, d.password, d.online_status, d.longitude, d.latitude, \
             d.deleted, d.date_created AS driver_date_created, \
             c.license_plate, c.convertible, c.rating, c.engine_type, \
             c.manufacturer, c.car_status, c.date_created AS car_date_created \
             FROM driver_car s \
             JOIN driver d ON d.id = s.driver_id \
             JOIN car c ON c.id = s.car_id \
             WHERE d.deleted = FALSE AND c.car_status = 'ACTIVE'",
        );
        Self::apply_filter(&mut qb, filter);

        qb.push(" ORDER BY s.id LIMIT ");
        qb.push_bind(page_size as i64);
        qb.push(" OFFSET ");
        qb.push_bind(page as i64 * page_size as i64);

        let rows = qb.build().fetch_all(&self.pool).await?;

        let mut pairings = Vec::with_capacity(rows.len());
        for row in rows {
            let selection = Selection {
                id: row.try_get("selection_id")?,
                driver_id: row.try_get("driver_id")?,
                car_id: row.try_get("car_id")?,
                selected: row.try_get("selected")?,
            };
            let driver = Driver {
                id: selection.driver_id,
                username: row.try_get("username")?,
                password: row.try_get("password")?,
                online_status: row.try_get("online_status")?,
                longitude: row.try_get("longitude")?,
                latitude: row.try_get("latitude")?,
                deleted: row.try_get("deleted")?,
                date_created: row.try_get("driver_date_created")?,
            };
            let car = Car {
                id: selection.car_id,
                license_plate: row.try_get("license_plate")?,
                convertible: row.try_get("convertible")?,
                rating: row.try_get("rating")?,
                engine_type: row.try_get("engine_type")?,
                manufacturer: row.try_get("manufacturer")?,
                car_status: row.try_get("car_status")?,
                date_created: row.try_get("car_date_created")?,
            };
            pairings.push(CarDriverPairing {
                selection,
                driver,
                car,
            });
        }

        Ok((pairings, total))
    }
}
