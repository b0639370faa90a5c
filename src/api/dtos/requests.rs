use crate::domain::models::availability::Availability;
use serde::Deserialize;

// Date and time stay optional so a missing selection gets the
// "select a date and time" message instead of a generic JSON rejection.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateBookingRequest {
    pub tutor_id: String,
    pub date: Option<String>,
    pub time: Option<String>,
    pub duration: Option<i32>,
    #[serde(default)]
    pub use_trial: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateRecurringBookingRequest {
    pub tutor_id: String,
    pub start_date: Option<String>,
    pub time: Option<String>,
    pub weeks: u32,
    pub duration: Option<i32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QuoteRequest {
    pub tutor_id: String,
    #[serde(default)]
    pub is_recurring: bool,
    pub recurring_weeks: Option<u32>,
    #[serde(default)]
    pub use_trial: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateCheckoutSessionRequest {
    pub booking_id: String,
    pub recurring_id: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    pub recurring_weeks: Option<u32>,
    #[serde(default)]
    pub use_trial: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CancelCheckoutRequest {
    pub booking_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWebhookRequest {
    pub session_id: String,
    pub booking_id: String,
    pub status: crate::domain::models::checkout::RemoteSessionStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateAvailabilityRequest {
    pub availability: Availability,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpsertTutorProfileRequest {
    pub display_name: String,
    pub hourly_rate: f64,
}

#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: Option<String>,
    pub tz: Option<String>,
}
