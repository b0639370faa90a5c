use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;

pub const LESSON_DURATION_MIN: i32 = 60;

#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        }
    }

    /// Money capture only moves forward out of `pending`.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Paid) | (PaymentStatus::Pending, PaymentStatus::Failed)
        )
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LessonStatus {
    Confirmed,
    Cancelled,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub tutor_id: String,
    pub student_id: String,
    pub date: NaiveDate,
    pub time: String,
    #[serde(rename = "duration")]
    pub duration_min: i32,
    pub payment_status: PaymentStatus,
    pub payment_amount: f64,
    pub status: LessonStatus,
    pub is_trial: bool,
    pub recurring_id: Option<String>,
    pub checkout_session_id: Option<String>,
    pub checkout_url: Option<String>,
    pub meeting_link: Option<String>,
    pub review_completed: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub tutor_id: String,
    pub student_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub amount: f64,
    pub is_trial: bool,
    pub recurring_id: Option<String>,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tutor_id: params.tutor_id,
            student_id: params.student_id,
            date: params.date,
            time: params.time.format("%H:%M").to_string(),
            duration_min: LESSON_DURATION_MIN,
            payment_status: PaymentStatus::Pending,
            payment_amount: params.amount,
            status: LessonStatus::Confirmed,
            is_trial: params.is_trial,
            recurring_id: params.recurring_id,
            checkout_session_id: None,
            checkout_url: None,
            meeting_link: None,
            review_completed: false,
            created_at: Utc::now(),
        }
    }

    /// Lesson start in UTC. Rows only ever hold canonical `HH:MM` times.
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        let time = NaiveTime::parse_from_str(&self.time, "%H:%M").ok()?;
        Some(self.date.and_time(time).and_utc())
    }

    pub fn is_participant(&self, user_id: &str) -> bool {
        self.student_id == user_id || self.tutor_id == user_id
    }

    /// Holds its slot: not cancelled and not a failed payment.
    pub fn occupies_slot(&self) -> bool {
        self.status == LessonStatus::Confirmed && self.payment_status != PaymentStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Booking {
        Booking::new(NewBookingParams {
            tutor_id: "tutor-1".into(),
            student_id: "student-1".into(),
            date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            amount: 20.0,
            is_trial: false,
            recurring_id: None,
        })
    }

    #[test]
    fn new_booking_starts_pending_and_confirmed() {
        let booking = sample();
        assert_eq!(booking.payment_status, PaymentStatus::Pending);
        assert_eq!(booking.status, LessonStatus::Confirmed);
        assert_eq!(booking.time, "09:00");
        assert_eq!(booking.duration_min, 60);
        assert!(booking.occupies_slot());
    }

    #[test]
    fn payment_status_never_returns_to_pending() {
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Paid));
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Failed));
        assert!(!PaymentStatus::Paid.can_transition_to(PaymentStatus::Pending));
        assert!(!PaymentStatus::Failed.can_transition_to(PaymentStatus::Paid));
    }

    #[test]
    fn starts_at_combines_date_and_utc_time() {
        let booking = sample();
        assert_eq!(booking.starts_at().unwrap().to_rfc3339(), "2025-01-06T09:00:00+00:00");
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["tutorId"], "tutor-1");
        assert_eq!(json["paymentStatus"], "pending");
        assert_eq!(json["paymentAmount"], 20.0);
        assert_eq!(json["duration"], 60);
        assert_eq!(json["date"], "2025-01-06");
    }
}
