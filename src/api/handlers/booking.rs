use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::{
    requests::{CreateBookingRequest, CreateRecurringBookingRequest, QuoteRequest},
    responses::RecurringBookingResponse,
};
use crate::api::handlers::trial::trial_status_for;
use crate::domain::models::{
    booking::{Booking, LessonStatus, NewBookingParams, PaymentStatus, LESSON_DURATION_MIN},
    trial::TrialStatus,
    tutor::Tutor,
};
use crate::domain::services::{
    availability::{format_slot_time, is_slot_bookable, require_selection},
    pricing::{compute_price, BookingOptions, RecurringWeeks},
    schedule::{build_series, generate_series, SeriesParams},
};
use crate::error::AppError;
use std::sync::Arc;
use chrono::{NaiveDate, NaiveTime, Utc};
use tracing::{info, warn};

fn check_duration(duration: Option<i32>) -> Result<(), AppError> {
    match duration {
        None => Ok(()),
        Some(d) if d == LESSON_DURATION_MIN => Ok(()),
        Some(d) => Err(AppError::Validation(format!("Only {}-minute lessons can be booked (got {})", LESSON_DURATION_MIN, d))),
    }
}

fn ensure_future(date: NaiveDate, time: NaiveTime) -> Result<(), AppError> {
    if date.and_time(time).and_utc() <= Utc::now() {
        return Err(AppError::Validation("Cannot book a lesson in the past".into()));
    }
    Ok(())
}

async fn load_bookable_tutor(state: &AppState, tutor_id: &str, caller_id: &str) -> Result<Tutor, AppError> {
    let tutor = state.tutor_repo.find_by_id(tutor_id).await?
        .ok_or(AppError::NotFound("Tutor not found".into()))?;
    if tutor.id == caller_id {
        return Err(AppError::Validation("You cannot book a lesson with yourself".into()));
    }
    Ok(tutor)
}

async fn ensure_declared(state: &AppState, tutor_id: &str, date: NaiveDate, time: NaiveTime) -> Result<(), AppError> {
    let availability = state.availability_repo.find_by_tutor(tutor_id).await?;
    if !is_slot_bookable(&availability, date, time) {
        warn!("Booking rejected: {} {} is not in tutor {}'s availability", date, format_slot_time(time), tutor_id);
        return Err(AppError::Validation("Selected time is not in the tutor's availability".into()));
    }
    Ok(())
}

async fn ensure_slot_free(state: &AppState, tutor_id: &str, date: NaiveDate, time: NaiveTime) -> Result<(), AppError> {
    let key = format_slot_time(time);
    let existing = state.booking_repo.list_active_on(tutor_id, date).await?;
    if existing.iter().any(|b| b.time == key) {
        return Err(AppError::Conflict(format!("The slot on {} at {} is already booked", date, key)));
    }
    Ok(())
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (date, time) = require_selection(payload.date.as_deref(), payload.time.as_deref())?;
    check_duration(payload.duration)?;
    info!("create_booking: tutor {} on {} at {}", payload.tutor_id, date, format_slot_time(time));

    let tutor = load_bookable_tutor(&state, &payload.tutor_id, &caller.id).await?;
    ensure_future(date, time)?;
    ensure_declared(&state, &tutor.id, date, time).await?;
    ensure_slot_free(&state, &tutor.id, date, time).await?;

    let mut options = BookingOptions::single();
    options.set_use_trial(payload.use_trial);

    let trial = if options.use_trial() {
        let status = trial_status_for(&state, &caller.id).await?;
        if !status.eligible {
            return Err(AppError::Validation("Trial lesson is not available for this account".into()));
        }
        status
    } else {
        TrialStatus::unavailable(state.config.trial_price)
    };

    // paymentAmount records what will actually be charged, trial price included.
    let quote = compute_price(tutor.hourly_rate, &options, &trial)?;

    let booking = Booking::new(NewBookingParams {
        tutor_id: tutor.id.clone(),
        student_id: caller.id.clone(),
        date,
        time,
        amount: quote.amount,
        is_trial: quote.is_trial,
        recurring_id: None,
    });

    let created = state.booking_repo.create(&booking).await?;
    info!("Booking created: {} (pending payment of {})", created.id, created.payment_amount);
    Ok(Json(created))
}

pub async fn create_recurring_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Json(payload): Json<CreateRecurringBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (start_date, time) = require_selection(payload.start_date.as_deref(), payload.time.as_deref())?;
    let weeks = RecurringWeeks::try_from(payload.weeks)?;
    check_duration(payload.duration)?;
    info!("create_recurring_booking: tutor {} from {} at {} for {} weeks", payload.tutor_id, start_date, format_slot_time(time), weeks.count());

    let tutor = load_bookable_tutor(&state, &payload.tutor_id, &caller.id).await?;
    ensure_future(start_date, time)?;
    // Every week lands on the same weekday, so one check covers the series.
    ensure_declared(&state, &tutor.id, start_date, time).await?;
    for date in generate_series(start_date, weeks) {
        ensure_slot_free(&state, &tutor.id, date, time).await?;
    }

    let quote = compute_price(
        tutor.hourly_rate,
        &BookingOptions::recurring(weeks),
        &TrialStatus::unavailable(state.config.trial_price),
    )?;

    let series = build_series(SeriesParams {
        tutor_id: tutor.id.clone(),
        student_id: caller.id.clone(),
        start_date,
        time,
        weeks,
        total_amount: quote.amount,
    });

    let created = state.booking_repo.create_series(&series).await?;
    let recurring_id = created.first()
        .and_then(|b| b.recurring_id.clone())
        .ok_or(AppError::Internal)?;

    info!("Recurring series {} created: {} bookings, total {}", recurring_id, created.len(), quote.amount);
    Ok(Json(RecurringBookingResponse {
        recurring_id,
        total_amount: quote.amount,
        savings: quote.savings,
        discount_percent: quote.discount_percent,
        bookings: created,
    }))
}

pub async fn quote_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Json(payload): Json<QuoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let options = BookingOptions::from_request(payload.is_recurring, payload.recurring_weeks, payload.use_trial)?;

    let tutor = state.tutor_repo.find_by_id(&payload.tutor_id).await?
        .ok_or(AppError::NotFound("Tutor not found".into()))?;

    let trial = if options.use_trial() {
        trial_status_for(&state, &caller.id).await?
    } else {
        TrialStatus::unavailable(state.config.trial_price)
    };

    Ok(Json(compute_price(tutor.hourly_rate, &options, &trial)?))
}

pub async fn list_my_bookings(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_repo.list_for_user(&caller.id).await?;
    Ok(Json(bookings))
}

pub async fn cancel_lesson(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_repo.find_by_id(&booking_id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;

    if !booking.is_participant(&caller.id) {
        return Err(AppError::Forbidden("Not a participant of this booking".into()));
    }

    if booking.status == LessonStatus::Cancelled {
        return Ok(Json(booking));
    }

    if booking.payment_status == PaymentStatus::Pending && booking.checkout_session_id.is_some() {
        let payment_status = state.payment_service.sync_status(&booking).await?;
        if payment_status == PaymentStatus::Pending {
            return Err(AppError::Conflict("Payment is still in progress; cancel the checkout instead".into()));
        }
    }

    let starts_at = booking.starts_at().ok_or(AppError::Internal)?;
    if starts_at <= Utc::now() {
        return Err(AppError::Conflict("The lesson has already started".into()));
    }

    let cancelled = state.booking_repo.cancel(&booking.id).await?;
    info!("Lesson {} cancelled by {}", cancelled.id, caller.id);
    Ok(Json(cancelled))
}
