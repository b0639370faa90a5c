use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::TutorUser;
use crate::api::dtos::{
    requests::{SlotsQuery, UpdateAvailabilityRequest, UpsertTutorProfileRequest},
    responses::{AvailabilityResponse, SlotView, SlotsResponse},
};
use crate::domain::models::{availability::Availability, tutor::Tutor};
use crate::domain::services::{
    availability::{calculate_slots, canonicalize, parse_date, parse_slot_time},
    local_time::{parse_zone, to_local},
    pricing::MAX_HOURLY_RATE,
};
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;
use tracing::{info, warn};

pub async fn get_tutor(
    State(state): State<Arc<AppState>>,
    Path(tutor_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let tutor = state.tutor_repo.find_by_id(&tutor_id).await?
        .ok_or(AppError::NotFound("Tutor not found".into()))?;
    Ok(Json(tutor))
}

/// Unknown tutors and read failures both yield an empty week.
pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Path(tutor_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let availability = match state.availability_repo.find_by_tutor(&tutor_id).await {
        Ok(availability) => availability,
        Err(e) => {
            warn!("Could not load availability for tutor {}: {}", tutor_id, e);
            Availability::default()
        }
    };

    Ok(Json(AvailabilityResponse {
        tutor_id,
        timezone: "UTC",
        availability,
    }))
}

pub async fn get_slots(
    State(state): State<Arc<AppState>>,
    Path(tutor_id): Path<String>,
    Query(query): Query<SlotsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let raw_date = query.date
        .ok_or(AppError::Validation("Please select a date".into()))?;
    let date = parse_date(&raw_date)?;
    let zone_name = query.tz.unwrap_or_else(|| "UTC".to_string());
    let zone = parse_zone(&zone_name)?;

    let availability = state.availability_repo.find_by_tutor(&tutor_id).await?;
    let existing = state.booking_repo.list_active_on(&tutor_id, date).await?;

    let mut slots = Vec::new();
    for slot in calculate_slots(&availability, date, &existing, Utc::now()) {
        let local = to_local(date, parse_slot_time(&slot.time)?, zone);
        slots.push(SlotView {
            time: slot.time,
            local_date: local.date,
            local_time: local.time,
            display: local.display,
            available: slot.available,
        });
    }

    Ok(Json(SlotsResponse {
        date: date.to_string(),
        timezone: zone_name,
        slots,
    }))
}

pub async fn update_availability(
    State(state): State<Arc<AppState>>,
    TutorUser(caller): TutorUser,
    Json(payload): Json<UpdateAvailabilityRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.tutor_repo.find_by_id(&caller.id).await?
        .ok_or(AppError::NotFound("Tutor profile not found; set an hourly rate first".into()))?;

    let availability = canonicalize(payload.availability)?;
    let saved = state.availability_repo.replace(&caller.id, &availability).await?;

    info!("Availability replaced for tutor {} ({} slots)", caller.id, saved.slot_count());
    Ok(Json(AvailabilityResponse {
        tutor_id: caller.id,
        timezone: "UTC",
        availability: saved,
    }))
}

pub async fn upsert_profile(
    State(state): State<Arc<AppState>>,
    TutorUser(caller): TutorUser,
    Json(payload): Json<UpsertTutorProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !payload.hourly_rate.is_finite() || payload.hourly_rate <= 0.0 || payload.hourly_rate > MAX_HOURLY_RATE {
        return Err(AppError::Validation(format!("Hourly rate must be a positive number up to {}", MAX_HOURLY_RATE)));
    }
    let display_name = payload.display_name.trim().to_string();
    if display_name.is_empty() {
        return Err(AppError::Validation("Display name is required".into()));
    }

    let mut tutor = Tutor::new(caller.id.clone(), display_name, payload.hourly_rate);
    if let Some(existing) = state.tutor_repo.find_by_id(&caller.id).await? {
        tutor.created_at = existing.created_at;
    }

    let saved = state.tutor_repo.upsert(&tutor).await?;
    info!("Tutor profile saved: {} at {}/h", saved.id, saved.hourly_rate);
    Ok(Json(saved))
}
