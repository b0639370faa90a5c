use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, tutor, trial, booking, checkout};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Tutors (public)
        .route("/api/tutors/{id}", get(tutor::get_tutor))
        .route("/api/tutors/{id}/availability", get(tutor::get_availability))
        .route("/api/tutors/{id}/slots", get(tutor::get_slots))

        // Tutor self-service (UTC only)
        .route("/api/tutor/availability", put(tutor::update_availability))
        .route("/api/tutor/profile", put(tutor::upsert_profile))

        // Students
        .route("/api/users/trial-status", get(trial::get_trial_status))

        // Booking Flow
        .route("/api/bookings", post(booking::create_booking).get(booking::list_my_bookings))
        .route("/api/bookings/quote", post(booking::quote_booking))
        .route("/api/bookings/recurring", post(booking::create_recurring_booking))
        .route("/api/bookings/{id}/cancel", post(booking::cancel_lesson))

        // Payment Handoff
        .route("/api/checkout/create-session", post(checkout::create_session))
        .route("/api/checkout/status/{booking_id}", get(checkout::get_status))
        .route("/api/checkout/cancel", post(checkout::cancel_checkout))
        .route("/api/checkout/webhook", post(checkout::payment_webhook))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
