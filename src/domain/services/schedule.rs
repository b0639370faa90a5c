use crate::domain::models::booking::{Booking, NewBookingParams};
use crate::domain::services::pricing::{split_amount, RecurringWeeks};
use chrono::{Duration, NaiveDate, NaiveTime};
use uuid::Uuid;

/// Lesson dates of a weekly series, each exactly seven days after the last.
pub fn generate_series(start_date: NaiveDate, weeks: RecurringWeeks) -> Vec<NaiveDate> {
    (0..weeks.count())
        .map(|week| start_date + Duration::days(7 * i64::from(week)))
        .collect()
}

pub struct SeriesParams {
    pub tutor_id: String,
    pub student_id: String,
    pub start_date: NaiveDate,
    pub time: NaiveTime,
    pub weeks: RecurringWeeks,
    pub total_amount: f64,
}

/// Builds the pending bookings of a series under one fresh `recurring_id`.
/// The first element is the booking that carries the payment session.
pub fn build_series(params: SeriesParams) -> Vec<Booking> {
    let recurring_id = Uuid::new_v4().to_string();
    let dates = generate_series(params.start_date, params.weeks);
    let amounts = split_amount(params.total_amount, params.weeks.count());

    dates
        .into_iter()
        .zip(amounts)
        .map(|(date, amount)| {
            Booking::new(NewBookingParams {
                tutor_id: params.tutor_id.clone(),
                student_id: params.student_id.clone(),
                date,
                time: params.time,
                amount,
                is_trial: false,
                recurring_id: Some(recurring_id.clone()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_week_series_from_monday() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let dates: Vec<String> = generate_series(start, RecurringWeeks::Four)
            .iter()
            .map(|d| d.to_string())
            .collect();
        assert_eq!(dates, vec!["2025-01-06", "2025-01-13", "2025-01-20", "2025-01-27"]);
    }

    #[test]
    fn series_crosses_month_and_year_boundaries() {
        let start = NaiveDate::from_ymd_opt(2024, 12, 18).unwrap();
        let dates = generate_series(start, RecurringWeeks::Eight);
        assert_eq!(dates.len(), 8);
        assert_eq!(dates[2].to_string(), "2025-01-01");
        for pair in dates.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::days(7));
        }
    }

    #[test]
    fn built_series_shares_one_recurring_id() {
        let series = build_series(SeriesParams {
            tutor_id: "tutor".into(),
            student_id: "student".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            weeks: RecurringWeeks::Four,
            total_amount: 72.0,
        });

        assert_eq!(series.len(), 4);
        let recurring_id = series[0].recurring_id.clone().unwrap();
        assert!(series.iter().all(|b| b.recurring_id.as_deref() == Some(recurring_id.as_str())));
        assert!(series.iter().all(|b| b.time == "09:00" && !b.is_trial));
        assert_eq!(series.iter().map(|b| b.payment_amount).sum::<f64>(), 72.0);
        assert_eq!(series[0].date.to_string(), "2025-01-06");
    }
}
