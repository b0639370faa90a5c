use crate::domain::models::{availability::{Availability, DayOfWeek}, booking::Booking};
use crate::error::AppError;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Dates are anchored at midday before the weekday is read so that a later
/// timezone shift can never move them across midnight.
pub fn weekday_of(date: NaiveDate) -> DayOfWeek {
    date.and_hms_opt(12, 0, 0)
        .map(|noon| noon.weekday())
        .unwrap_or_else(|| date.weekday())
        .into()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format (YYYY-MM-DD)".into()))
}

/// Parses a 24-hour `HH:MM` time; `9:05` is accepted and canonicalised.
pub fn parse_slot_time(raw: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| AppError::Validation(format!("Invalid time format (HH:MM): {}", raw)))
}

pub fn format_slot_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Both parts of a slot selection must be present before anything else is checked.
pub fn require_selection(date: Option<&str>, time: Option<&str>) -> Result<(NaiveDate, NaiveTime), AppError> {
    match (date.map(str::trim), time.map(str::trim)) {
        (Some(d), Some(t)) if !d.is_empty() && !t.is_empty() => Ok((parse_date(d)?, parse_slot_time(t)?)),
        _ => Err(AppError::Validation("Please select a date and time".into())),
    }
}

/// Normalises every time to `HH:MM` and rejects anything unparseable.
pub fn canonicalize(availability: Availability) -> Result<Availability, AppError> {
    let mut map: BTreeMap<DayOfWeek, BTreeSet<String>> = BTreeMap::new();
    for (day, times) in availability.0 {
        let entry = map.entry(day).or_default();
        for raw in times {
            entry.insert(format_slot_time(parse_slot_time(&raw)?));
        }
    }
    map.retain(|_, times| !times.is_empty());
    Ok(Availability(map))
}

/// A slot is bookable only when its exact time is declared for that weekday.
pub fn is_slot_bookable(availability: &Availability, date: NaiveDate, time: NaiveTime) -> bool {
    let key = format_slot_time(time);
    availability
        .times_on(weekday_of(date))
        .map(|times| times.contains(&key))
        .unwrap_or(false)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DaySlot {
    pub time: String,
    pub available: bool,
}

/// Declared slots for one date, flagged unavailable when already taken or
/// already started.
pub fn calculate_slots(
    availability: &Availability,
    date: NaiveDate,
    existing_bookings: &[Booking],
    now: DateTime<Utc>,
) -> Vec<DaySlot> {
    let Some(times) = availability.times_on(weekday_of(date)) else {
        return Vec::new();
    };

    let taken: BTreeSet<&str> = existing_bookings
        .iter()
        .filter(|b| b.date == date && b.occupies_slot())
        .map(|b| b.time.as_str())
        .collect();

    times
        .iter()
        .filter_map(|time| {
            let start = date.and_time(parse_slot_time(time).ok()?).and_utc();
            Some(DaySlot {
                time: time.clone(),
                available: start > now && !taken.contains(time.as_str()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::booking::{LessonStatus, NewBookingParams};
    use serde_json::json;

    fn weekly() -> Availability {
        serde_json::from_value(json!({
            "monday": ["09:00", "10:00", "14:00"],
            "wednesday": ["18:30"]
        })).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn booking_at(d: NaiveDate, t: NaiveTime) -> Booking {
        Booking::new(NewBookingParams {
            tutor_id: "tutor".into(),
            student_id: "student".into(),
            date: d,
            time: t,
            amount: 20.0,
            is_trial: false,
            recurring_id: None,
        })
    }

    #[test]
    fn weekday_is_derived_from_calendar_date() {
        assert_eq!(weekday_of(date(2025, 1, 6)), DayOfWeek::Monday);
        assert_eq!(weekday_of(date(2025, 1, 12)), DayOfWeek::Sunday);
        assert_eq!(weekday_of(date(2024, 2, 29)), DayOfWeek::Thursday);
    }

    #[test]
    fn slot_membership_is_exact() {
        let availability = weekly();
        let monday = date(2025, 1, 6);

        assert!(is_slot_bookable(&availability, monday, time(9, 0)));
        assert!(is_slot_bookable(&availability, monday, time(14, 0)));
        assert!(!is_slot_bookable(&availability, monday, time(9, 30)));
        assert!(!is_slot_bookable(&availability, monday, time(11, 0)));
        // Declared for Wednesday only.
        assert!(!is_slot_bookable(&availability, monday, time(18, 30)));
        assert!(is_slot_bookable(&availability, date(2025, 1, 8), time(18, 30)));
        assert!(!is_slot_bookable(&availability, date(2025, 1, 7), time(9, 0)));
    }

    #[test]
    fn empty_availability_books_nothing() {
        assert!(!is_slot_bookable(&Availability::default(), date(2025, 1, 6), time(9, 0)));
    }

    #[test]
    fn missing_date_or_time_asks_for_selection() {
        for (d, t) in [(None, Some("09:00")), (Some("2025-01-06"), None), (Some(""), Some("09:00")), (None, None)] {
            match require_selection(d, t) {
                Err(AppError::Validation(msg)) => assert_eq!(msg, "Please select a date and time"),
                other => panic!("expected validation error, got {:?}", other),
            }
        }
        assert!(require_selection(Some("2025-01-06"), Some("09:00")).is_ok());
    }

    #[test]
    fn canonicalize_pads_and_rejects_garbage() {
        let raw: Availability = serde_json::from_value(json!({
            "monday": ["9:00", "09:00", "13:05"],
            "tuesday": []
        })).unwrap();
        let canonical = canonicalize(raw).unwrap();
        let monday: Vec<_> = canonical.times_on(DayOfWeek::Monday).unwrap().iter().cloned().collect();
        assert_eq!(monday, vec!["09:00", "13:05"]);
        assert!(canonical.times_on(DayOfWeek::Tuesday).is_none());

        let bad: Availability = serde_json::from_value(json!({ "monday": ["25:00"] })).unwrap();
        assert!(matches!(canonicalize(bad), Err(AppError::Validation(_))));
    }

    #[test]
    fn calculate_slots_marks_taken_and_past_times() {
        let availability = weekly();
        let monday = date(2025, 1, 6);
        let now = monday.and_time(time(9, 30)).and_utc();

        let mut cancelled = booking_at(monday, time(14, 0));
        cancelled.status = LessonStatus::Cancelled;
        let existing = vec![booking_at(monday, time(10, 0)), cancelled];

        let slots = calculate_slots(&availability, monday, &existing, now);
        assert_eq!(slots, vec![
            DaySlot { time: "09:00".into(), available: false },
            DaySlot { time: "10:00".into(), available: false },
            DaySlot { time: "14:00".into(), available: true },
        ]);
    }
}
