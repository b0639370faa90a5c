use crate::error::AppError;
use chrono::{LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

pub fn parse_zone(raw: &str) -> Result<Tz, AppError> {
    raw.parse::<Tz>()
        .map_err(|_| AppError::Validation(format!("Unknown timezone: {}", raw)))
}

/// A stored UTC slot as the viewer sees it.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocalSlot {
    pub date: NaiveDate,
    pub time: String,
    pub display: String,
}

/// Interprets `utc_time` on `date` as UTC and renders it in `zone`.
/// Never touches stored data.
pub fn to_local(date: NaiveDate, utc_time: NaiveTime, zone: Tz) -> LocalSlot {
    let local = Utc.from_utc_datetime(&date.and_time(utc_time)).with_timezone(&zone);
    LocalSlot {
        date: local.date_naive(),
        time: local.format("%H:%M").to_string(),
        display: local.format("%-I:%M %p").to_string(),
    }
}

/// Inverse of [`to_local`]: a wall-clock time in `zone` back to UTC date and time.
pub fn to_utc(local_date: NaiveDate, local_time: NaiveTime, zone: Tz) -> Result<(NaiveDate, NaiveTime), AppError> {
    match zone.from_local_datetime(&local_date.and_time(local_time)) {
        LocalResult::Single(dt) => {
            let utc = dt.with_timezone(&Utc);
            Ok((utc.date_naive(), utc.time()))
        }
        LocalResult::Ambiguous(_, _) => Err(AppError::Validation("Local time is ambiguous (DST change)".into())),
        LocalResult::None => Err(AppError::Validation("Local time does not exist (DST change)".into())),
    }
}
