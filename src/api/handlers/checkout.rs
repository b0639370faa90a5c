use axum::{body::Bytes, extract::{State, Path}, http::HeaderMap, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::{
    requests::{CancelCheckoutRequest, CreateCheckoutSessionRequest, PaymentWebhookRequest},
    responses::{CheckoutSessionResponse, CheckoutStatusResponse, ReleasedResponse},
};
use crate::domain::models::{
    booking::{LessonStatus, PaymentStatus},
    checkout::CheckoutRequest,
};
use crate::domain::services::{
    payment_service::verify_signature,
    pricing::{from_cents, to_cents, BookingOptions},
};
use crate::error::AppError;
use std::sync::Arc;
use tracing::{info, warn};

pub const SIGNATURE_HEADER: &str = "X-Payment-Signature";

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Json(payload): Json<CreateCheckoutSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let options = BookingOptions::from_request(payload.is_recurring, payload.recurring_weeks, payload.use_trial)?;

    let booking = state.booking_repo.find_by_id(&payload.booking_id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;

    if booking.student_id != caller.id {
        return Err(AppError::Forbidden("Not your booking".into()));
    }
    if booking.status == LessonStatus::Cancelled {
        return Err(AppError::Conflict("Booking has been cancelled".into()));
    }
    match booking.payment_status {
        PaymentStatus::Pending => {}
        PaymentStatus::Paid => return Err(AppError::Conflict("Booking is already paid".into())),
        PaymentStatus::Failed => return Err(AppError::Conflict("Payment for this booking failed; please book again".into())),
    }

    if options.is_recurring() != booking.recurring_id.is_some() {
        return Err(AppError::Validation("isRecurring does not match the booking".into()));
    }
    if let Some(recurring_id) = payload.recurring_id.as_deref()
        && booking.recurring_id.as_deref() != Some(recurring_id) {
        return Err(AppError::Validation("recurringId does not match the booking".into()));
    }
    if options.use_trial() != booking.is_trial {
        return Err(AppError::Validation("Trial flag does not match the booking".into()));
    }

    let series = state.payment_service.series_of(&booking).await?;
    if options.is_recurring() && series.len() as u32 != options.lesson_count() {
        return Err(AppError::Validation("recurringWeeks does not match the booked series".into()));
    }
    let first = series.first().ok_or(AppError::Internal)?;

    // Stored rows are the price of record; client-side figures are never trusted.
    let amount = from_cents(series.iter().map(|b| to_cents(b.payment_amount)).sum());

    // A session that is already attached may have been paid; it is resumed, never replaced.
    if let Some(session_id) = booking.checkout_session_id.clone() {
        return match state.payment_service.sync_status(&booking).await? {
            PaymentStatus::Pending => {
                info!("Resuming checkout session {} for booking {}", session_id, first.id);
                Ok(Json(CheckoutSessionResponse {
                    session_id,
                    url: booking.checkout_url.clone().unwrap_or_default(),
                    amount,
                    currency: state.config.currency.clone(),
                }))
            }
            PaymentStatus::Paid => Err(AppError::Conflict("Booking is already paid".into())),
            PaymentStatus::Failed => Err(AppError::Conflict("Payment for this booking failed; please book again".into())),
        };
    }

    let request = CheckoutRequest {
        reference: first.id.clone(),
        amount,
        currency: state.config.currency.clone(),
        description: if series.len() > 1 {
            format!("{} weekly lessons starting {} at {} UTC", series.len(), first.date, first.time)
        } else {
            format!("Lesson on {} at {} UTC", first.date, first.time)
        },
        success_url: format!("{}?bookingId={}", state.config.checkout_success_url, first.id),
        cancel_url: format!("{}?bookingId={}", state.config.checkout_cancel_url, first.id),
    };

    let session = state.payment_gateway.create_session(&request).await?;

    let ids: Vec<String> = series.iter().map(|b| b.id.clone()).collect();
    state.booking_repo.attach_checkout_session(&ids, &session).await?;

    info!("Checkout session {} created for booking {} ({})", session.id, first.id, amount);
    Ok(Json(CheckoutSessionResponse {
        session_id: session.id,
        url: session.url,
        amount,
        currency: request.currency,
    }))
}

pub async fn get_status(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_repo.find_by_id(&booking_id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;

    if !booking.is_participant(&caller.id) {
        return Err(AppError::Forbidden("Not a participant of this booking".into()));
    }

    let payment_status = match state.payment_service.sync_status(&booking).await {
        Ok(status) => status,
        Err(AppError::Upstream(msg)) => {
            warn!("Payment status check failed for {}: {}", booking.id, msg);
            booking.payment_status
        }
        Err(e) => return Err(e),
    };

    Ok(Json(CheckoutStatusResponse {
        booking_id: booking.id,
        payment_status,
    }))
}

/// Releases an abandoned checkout so its slots can be booked again.
pub async fn cancel_checkout(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Json(payload): Json<CancelCheckoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_repo.find_by_id(&payload.booking_id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;

    if booking.student_id != caller.id {
        return Err(AppError::Forbidden("Not your booking".into()));
    }
    if booking.payment_status == PaymentStatus::Paid {
        return Err(AppError::Conflict("Booking is already paid".into()));
    }

    let series = state.payment_service.series_of(&booking).await?;
    let ids: Vec<String> = series.iter()
        .filter(|b| b.payment_status != PaymentStatus::Paid)
        .map(|b| b.id.clone())
        .collect();
    let released = state.booking_repo.release_unpaid(&ids).await?;

    info!("Released {} unpaid booking(s) for abandoned checkout of {}", released, booking.id);
    Ok(Json(ReleasedResponse {
        booking_id: booking.id,
        released,
    }))
}

pub async fn payment_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let signature = headers.get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    if !verify_signature(&state.config.payment_webhook_secret, &body, signature) {
        warn!("Payment webhook rejected: bad signature");
        return Err(AppError::Unauthorized);
    }

    let payload: PaymentWebhookRequest = serde_json::from_slice(&body)
        .map_err(|_| AppError::Validation("Malformed webhook payload".into()))?;

    let booking = state.booking_repo.find_by_id(&payload.booking_id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;

    if booking.checkout_session_id.as_deref() != Some(payload.session_id.as_str()) {
        return Err(AppError::Conflict("Session does not belong to this booking".into()));
    }

    let payment_status = state.payment_service.apply(&booking, payload.status).await?;
    Ok(Json(CheckoutStatusResponse {
        booking_id: booking.id,
        payment_status,
    }))
}
