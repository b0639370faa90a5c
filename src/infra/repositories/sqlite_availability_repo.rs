use crate::domain::{models::availability::{Availability, AvailabilitySlot}, ports::AvailabilityRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteAvailabilityRepo {
    pool: SqlitePool,
}

impl SqliteAvailabilityRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AvailabilityRepository for SqliteAvailabilityRepo {
    async fn find_by_tutor(&self, tutor_id: &str) -> Result<Availability, AppError> {
        let slots = sqlx::query_as::<_, AvailabilitySlot>(
            "SELECT tutor_id, weekday, time FROM tutor_availability WHERE tutor_id = ? ORDER BY weekday, time",
        )
            .bind(tutor_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(Availability::from_slots(slots))
    }

    async fn replace(&self, tutor_id: &str, availability: &Availability) -> Result<Availability, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("DELETE FROM tutor_availability WHERE tutor_id = ?")
            .bind(tutor_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        for slot in availability.to_slots(tutor_id) {
            sqlx::query("INSERT INTO tutor_availability (tutor_id, weekday, time) VALUES (?, ?, ?)")
                .bind(&slot.tutor_id)
                .bind(slot.weekday)
                .bind(&slot.time)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(availability.clone())
    }
}
