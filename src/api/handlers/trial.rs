use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::trial::TrialStatus;
use crate::error::AppError;
use std::sync::Arc;
use tracing::warn;

/// A student loses eligibility once a trial is paid, and also while a trial
/// booking of theirs still holds a slot.
pub async fn trial_status_for(state: &AppState, student_id: &str) -> Result<TrialStatus, AppError> {
    let price = state.config.trial_price;
    if state.student_repo.has_used_trial(student_id).await? {
        return Ok(TrialStatus::new(true, price));
    }

    let bookings = state.booking_repo.list_for_user(student_id).await?;
    let trial_in_flight = bookings
        .iter()
        .any(|b| b.student_id == student_id && b.is_trial && b.occupies_slot());

    let mut status = TrialStatus::new(false, price);
    status.eligible = !trial_in_flight;
    Ok(status)
}

pub async fn get_trial_status(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let status = match trial_status_for(&state, &caller.id).await {
        Ok(status) => status,
        Err(e) => {
            warn!("Could not load trial status for {}: {}", caller.id, e);
            TrialStatus::unavailable(state.config.trial_price)
        }
    };
    Ok(Json(status))
}
