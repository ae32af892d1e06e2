use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::car::Car;
use crate::utils::errors::{translate_db_error, AppResult};

/// Acceso a la tabla car. Los coches con car_status = DELETED quedan fuera
/// de todas las búsquedas por defecto; el borrado nunca elimina la fila.
#[async_trait]
pub trait CarRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Car>>;

    async fn create(
        &self,
        license_plate: &str,
        convertible: bool,
        rating: Option<f32>,
        engine_type: Option<&str>,
        manufacturer: Option<&str>,
    ) -> AppResult<Car>;

    async fn find_all(&self) -> AppResult<Vec<Car>>;

    /// Actualización de todos los campos editables (full-field update).
    async fn update(
        &self,
        id: i64,
        license_plate: &str,
        convertible: bool,
        rating: Option<f32>,
        engine_type: Option<&str>,
        manufacturer: Option<&str>,
    ) -> AppResult<Option<Car>>;

    /// Marca el coche como DELETED. Devuelve false si no existía.
    async fn delete(&self, id: i64) -> AppResult<bool>;
}

pub struct PgCarRepository {
    pool: PgPool,
}

impl PgCarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CarRepository for PgCarRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Car>> {
        let car = sqlx::query_as::<_, Car>(
            "SELECT * FROM car WHERE id = $1 AND car_status = 'ACTIVE'",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(car)
    }

    async fn create(
        &self,
        license_plate: &str,
        convertible: bool,
        rating: Option<f32>,
        engine_type: Option<&str>,
        manufacturer: Option<&str>,
    ) -> AppResult<Car> {
        let car = sqlx::query_as::<_, Car>(
            r#"
            INSERT INTO car (license_plate, convertible, rating, engine_type, manufacturer)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(license_plate)
        .bind(convertible)
        .bind(rating)
        .bind(engine_type)
        .bind(manufacturer)
        .fetch_one(&self.pool)
        .await
        .map_err(translate_db_error)?;

        Ok(car)
    }

    async fn find_all(&self) -> AppResult<Vec<Car>> {
        let cars = sqlx::query_as::<_, Car>(
            "SELECT * FROM car WHERE car_status = 'ACTIVE' ORDER BY date_created DESC",
        )
        .fetch_all(&self.pool)
        .await?;

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
        let car = sqlx::query_as::<_, Car>(
            r#"
            UPDATE car
            SET license_plate = $2, convertible = $3, rating = $4, engine_type = $5, manufacturer = $6
            WHERE id = $1 AND car_status = 'ACTIVE'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(license_plate)
        .bind(convertible)
        .bind(rating)
        .bind(engine_type)
        .bind(manufacturer)
        .fetch_optional(&self.pool)
        .await
        .map_err(translate_db_error)?;

        Ok(car)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE car SET car_status = 'DELETED' WHERE id = $1 AND car_status = 'ACTIVE'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
