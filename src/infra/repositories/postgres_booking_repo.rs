use crate::domain::{models::{booking::{Booking, PaymentStatus}, checkout::CheckoutSession}, ports::BookingRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use chrono::{DateTime, NaiveDate, Utc};

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn insert(tx: &mut Transaction<'_, Postgres>, booking: &Booking) -> Result<Booking, AppError> {
    sqlx::query_as::<_, Booking>("INSERT INTO bookings (id, tutor_id, student_id, date, time, duration_min, payment_status, payment_amount, status, is_trial, recurring_id, checkout_session_id, checkout_url, meeting_link, review_completed, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) RETURNING *").bind(&booking.id).bind(&booking.tutor_id).bind(&booking.student_id).bind(booking.date).bind(&booking.time).bind(booking.duration_min).bind(booking.payment_status).bind(booking.payment_amount).bind(booking.status).bind(booking.is_trial).bind(&booking.recurring_id).bind(&booking.checkout_session_id).bind(&booking.checkout_url).bind(&booking.meeting_link).bind(booking.review_completed).bind(booking.created_at).fetch_one(&mut **tx).await.map_err(AppError::Database)
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {

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
            created.push(insert(&mut tx, booking).await?);
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_by_series(&self, recurring_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE recurring_id = $1 ORDER BY date ASC, time ASC").bind(recurring_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE student_id = $1 OR tutor_id = $1 ORDER BY date ASC, time ASC").bind(user_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_active_on(&self, tutor_id: &str, date: NaiveDate) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE tutor_id = $1 AND date = $2 AND status = 'confirmed' AND payment_status <> 'failed' ORDER BY time ASC").bind(tutor_id).bind(date).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn attach_checkout_session(&self, ids: &[String], session: &CheckoutSession) -> Result<(), AppError> {
        sqlx::query("UPDATE bookings SET checkout_session_id = $1, checkout_url = $2 WHERE id = ANY($3)").bind(&session.id).bind(&session.url).bind(ids).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }
    async fn settle_payment(&self, ids: &[String], status: PaymentStatus) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE bookings SET payment_status = $1 WHERE id = ANY($2) AND payment_status = 'pending'").bind(status).bind(ids).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
    async fn cancel(&self, id: &str) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>("UPDATE bookings SET status = 'cancelled' WHERE id = $1 RETURNING *").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Booking not found".into()))
    }
    async fn release_unpaid(&self, ids: &[String]) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = ANY($1) AND payment_status <> 'paid'").bind(ids).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
    async fn delete_stale_pending(&self, created_before: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM bookings WHERE payment_status = 'pending' AND checkout_session_id IS NULL AND created_at < $1").bind(created_before).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
    async fn list_stale_checkouts(&self, created_before: DateTime<Utc>) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE payment_status = 'pending' AND checkout_session_id IS NOT NULL AND created_at < $1 ORDER BY created_at ASC").bind(created_before).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
