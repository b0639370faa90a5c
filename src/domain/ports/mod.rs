use crate::domain::models::{
    availability::Availability, booking::{Booking, PaymentStatus}, tutor::Tutor,
    checkout::{CheckoutRequest, CheckoutSession, RemoteSession},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

#[async_trait]
pub trait TutorRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Tutor>, AppError>;
    async fn upsert(&self, tutor: &Tutor) -> Result<Tutor, AppError>;
}

#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    async fn find_by_tutor(&self, tutor_id: &str) -> Result<Availability, AppError>;
    /// Replaces the tutor's whole week in one transaction.
    async fn replace(&self, tutor_id: &str, availability: &Availability) -> Result<Availability, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError>;
    /// All-or-nothing insert of a recurring series.
    async fn create_series(&self, bookings: &[Booking]) -> Result<Vec<Booking>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn list_by_series(&self, recurring_id: &str) -> Result<Vec<Booking>, AppError>;
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Booking>, AppError>;
    /// Bookings still holding a slot for the tutor on that date.
    async fn list_active_on(&self, tutor_id: &str, date: NaiveDate) -> Result<Vec<Booking>, AppError>;
    async fn attach_checkout_session(&self, ids: &[String], session: &CheckoutSession) -> Result<(), AppError>;
    /// Moves `pending` rows to `status`; returns the number of rows changed.
    async fn settle_payment(&self, ids: &[String], status: PaymentStatus) -> Result<u64, AppError>;
    async fn cancel(&self, id: &str) -> Result<Booking, AppError>;
    /// Deletes rows that are still unpaid; paid rows are left alone.
    async fn release_unpaid(&self, ids: &[String]) -> Result<u64, AppError>;
    /// Deletes `pending` rows created before the cutoff that never reached checkout.
    async fn delete_stale_pending(&self, created_before: DateTime<Utc>) -> Result<u64, AppError>;
    /// `pending` rows created before the cutoff that have a checkout session attached.
    async fn list_stale_checkouts(&self, created_before: DateTime<Utc>) -> Result<Vec<Booking>, AppError>;
}

#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn has_used_trial(&self, student_id: &str) -> Result<bool, AppError>;
    async fn mark_trial_used(&self, student_id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession, AppError>;
    async fn fetch_session(&self, session_id: &str) -> Result<RemoteSession, AppError>;
}
