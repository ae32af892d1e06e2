use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::driver::{Driver, OnlineStatus};
use crate::utils::errors::{translate_db_error, AppResult};

/// Acceso a la tabla driver. Los conductores borrados (soft delete) quedan
/// fuera de todas las búsquedas por defecto.
#[async_trait]
pub trait DriverRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Driver>>;

    async fn create(&self, username: &str, password_hash: &str) -> AppResult<Driver>;

    async fn find_by_online_status(&self, status: OnlineStatus) -> AppResult<Vec<Driver>>;

    async fn update_location(
        &self,
        id: i64,
        longitude: f64,
        latitude: f64,
    ) -> AppResult<Option<Driver>>;

    async fn update_online_status(
        &self,
        id: i64,
        status: OnlineStatus,
    ) -> AppResult<Option<Driver>>;

    /// Marca el conductor como borrado. Devuelve false si no existía.
    async fn delete(&self, id: i64) -> AppResult<bool>;
}

pub struct PgDriverRepository {
    pool: PgPool,
}

impl PgDriverRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DriverRepository for PgDriverRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Driver>> {
        let driver = sqlx::query_as::<_, Driver>(
            "SELECT * FROM driver WHERE id = $1 AND deleted = FALSE",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(driver)
    }

    async fn create(&self, username: &str, password_hash: &str) -> AppResult<Driver> {
        let driver = sqlx::query_as::<_, Driver>(
            r#"
            INSERT INTO driver (username, password)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(translate_db_error)?;

        Ok(driver)
    }

    async fn find_by_online_status(&self, status: OnlineStatus) -> AppResult<Vec<Driver>> {
        let drivers = sqlx::query_as::<_, Driver>(
            "SELECT * FROM driver WHERE online_status = $1 AND deleted = FALSE ORDER BY id",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(drivers)
    }

    async fn update_location(
        &self,
        id: i64,
        longitude: f64,
        latitude: f64,
    ) -> AppResult<Option<Driver>> {
        let driver = sqlx::query_as::<_, Driver>(
            r#"
            UPDATE driver
            SET longitude = $2, latitude = $3
            WHERE id = $1 AND deleted = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(longitude)
        .bind(latitude)
        .fetch_optional(&self.pool)
        .await?;

        Ok(driver)
    }

    async fn update_online_status(
        &self,
        id: i64,
        status: OnlineStatus,
    ) -> AppResult<Option<Driver>> {
        let driver = sqlx::query_as::<_, Driver>(
            r#"
            UPDATE driver
            SET online_status = $2
            WHERE id = $1 AND deleted = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(driver)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("UPDATE driver SET deleted = TRUE WHERE id = $1 AND deleted = FALSE")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
