use crate::domain::{models::{booking::{Booking, PaymentStatus}, checkout::CheckoutSession}, ports::BookingRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};
use chrono::{DateTime, NaiveDate, Utc};

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn insert(tx: &mut Transaction<'_, Sqlite>, booking: &Booking) -> Result<Booking, AppError> {
    sqlx::query_as::<_, Booking>(
        "INSERT INTO bookings (id, tutor_id, student_id, date, time, duration_min, payment_status, payment_amount, status, is_trial, recurring_id, checkout_session_id, checkout_url, meeting_link, review_completed, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         RETURNING *"
    )
        .bind(&booking.id).bind(&booking.tutor_id).bind(&booking.student_id).bind(booking.date)
        .bind(&booking.time).bind(booking.duration_min).bind(booking.payment_status).bind(booking.payment_amount)
        .bind(booking.status).bind(booking.is_trial).bind(&booking.recurring_id).bind(&booking.checkout_session_id)
        .bind(&booking.checkout_url).bind(&booking.meeting_link).bind(booking.review_completed).bind(booking.created_at)
        .fetch_one(&mut **tx).await.map_err(AppError::Database)
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let created = insert(&mut tx, booking).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }
    async fn create_series(&self, bookings: &[Booking]) -> Result<Vec<Booking>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let mut created = Vec::with_capacity(bookings.len());
        for booking in bookings {
            // Dropping the transaction on error rolls back the rows already inserted.
            created.push(insert(&mut tx, booking).await?);
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_by_series(&self, recurring_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE recurring_id = ? ORDER BY date ASC, time ASC").bind(recurring_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE student_id = ? OR tutor_id = ? ORDER BY date ASC, time ASC").bind(user_id).bind(user_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_active_on(&self, tutor_id: &str, date: NaiveDate) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE tutor_id = ? AND date = ? AND status = 'confirmed' AND payment_status != 'failed' ORDER BY time ASC").bind(tutor_id).bind(date).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn attach_checkout_session(&self, ids: &[String], session: &CheckoutSession) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        for id in ids {
            sqlx::query("UPDATE bookings SET checkout_session_id = ?, checkout_url = ? WHERE id = ?").bind(&session.id).bind(&session.url).bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
    async fn settle_payment(&self, ids: &[String], status: PaymentStatus) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let mut changed = 0;
        for id in ids {
            let result = sqlx::query("UPDATE bookings SET payment_status = ? WHERE id = ? AND payment_status = 'pending'").bind(status).bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
            changed += result.rows_affected();
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(changed)
    }
    async fn cancel(&self, id: &str) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>("UPDATE bookings SET status = 'cancelled' WHERE id = ? RETURNING *").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Booking not found".into()))
    }
    async fn release_unpaid(&self, ids: &[String]) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let mut released = 0;
        for id in ids {
            let result = sqlx::query("DELETE FROM bookings WHERE id = ? AND payment_status != 'paid'").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
            released += result.rows_affected();
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(released)
    }
    async fn delete_stale_pending(&self, created_before: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM bookings WHERE payment_status = 'pending' AND checkout_session_id IS NULL AND created_at < ?").bind(created_before).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
    async fn list_stale_checkouts(&self, created_before: DateTime<Utc>) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE payment_status = 'pending' AND checkout_session_id IS NOT NULL AND created_at < ? ORDER BY created_at ASC").bind(created_before).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
