use crate::domain::models::{availability::Availability, booking::{Booking, PaymentStatus}};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub tutor_id: String,
    pub timezone: &'static str,
    pub availability: Availability,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub time: String,
    pub local_date: NaiveDate,
    pub local_time: String,
    pub display: String,
    pub available: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotsResponse {
    pub date: String,
    pub timezone: String,
    pub slots: Vec<SlotView>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringBookingResponse {
    pub recurring_id: String,
    pub total_amount: f64,
    pub savings: f64,
    pub discount_percent: u32,
    pub bookings: Vec<Booking>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionResponse {
    pub session_id: String,
    pub url: String,
    pub amount: f64,
    pub currency: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutStatusResponse {
    pub booking_id: String,
    pub payment_status: PaymentStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleasedResponse {
    pub booking_id: String,
    pub released: u64,
}
