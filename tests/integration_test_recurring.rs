mod common;

use axum::http::StatusCode;
use chrono::{Duration, NaiveDate, NaiveTime, Weekday};
use common::{token_for, upcoming, TestApp};
use serde_json::json;
use tutoring_backend::domain::models::{
    auth::Role,
    booking::{Booking, NewBookingParams},
};

async fn setup() -> TestApp {
    let app = TestApp::new().await;
    app.seed_tutor("tutor-1", 20.0, json!({ "monday": ["14:00"] })).await;
    app
}

#[tokio::test]
async fn weekly_series_shares_one_recurring_id() {
    let app = setup().await;
    let student = token_for("student-1", Role::Student);
    let start = upcoming(Weekday::Mon);

    let (status, body) = app.request("POST", "/api/bookings/recurring", Some(&student), Some(json!({
        "tutorId": "tutor-1", "startDate": start.to_string(), "time": "14:00", "weeks": 4
    }))).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["totalAmount"], 72.0);
    assert_eq!(body["savings"], 8.0);
    assert_eq!(body["discountPercent"], 10);

    let recurring_id = body["recurringId"].as_str().unwrap();
    let bookings = body["bookings"].as_array().unwrap();
    assert_eq!(bookings.len(), 4);

    let mut total = 0.0;
    for (i, booking) in bookings.iter().enumerate() {
        let expected = start + Duration::weeks(i as i64);
        assert_eq!(booking["date"], expected.to_string());
        assert_eq!(booking["time"], "14:00");
        assert_eq!(booking["recurringId"], recurring_id);
        assert_eq!(booking["paymentStatus"], "pending");
        assert_eq!(booking["isTrial"], false);
        total += booking["paymentAmount"].as_f64().unwrap();
    }
    assert!((total - 72.0).abs() < 1e-9);
}

#[tokio::test]
async fn two_week_series_uses_smaller_discount() {
    let app = setup().await;
    let student = token_for("student-1", Role::Student);

    let (status, body) = app.request("POST", "/api/bookings/recurring", Some(&student), Some(json!({
        "tutorId": "tutor-1", "startDate": upcoming(Weekday::Mon).to_string(), "time": "14:00", "weeks": 2
    }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalAmount"], 38.0);
    assert_eq!(body["discountPercent"], 5);
    assert_eq!(body["bookings"][0]["paymentAmount"], 19.0);
    assert_eq!(body["bookings"][1]["paymentAmount"], 19.0);
}

#[tokio::test]
async fn unsupported_week_counts_are_rejected() {
    let app = setup().await;
    let student = token_for("student-1", Role::Student);

    for weeks in [0, 3, 5, 12] {
        let (status, _) = app.request("POST", "/api/bookings/recurring", Some(&student), Some(json!({
            "tutorId": "tutor-1", "startDate": upcoming(Weekday::Mon).to_string(), "time": "14:00", "weeks": weeks
        }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "weeks {}", weeks);
    }

    let (status, body) = app.request("POST", "/api/bookings/recurring", Some(&student), Some(json!({
        "tutorId": "tutor-1", "time": "14:00", "weeks": 4
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please select a date and time");
}

#[tokio::test]
async fn conflict_in_any_week_creates_nothing() {
    let app = setup().await;
    let start = upcoming(Weekday::Mon);
    let blocker = token_for("student-2", Role::Student);

    let (status, _) = app.request("POST", "/api/bookings", Some(&blocker), Some(json!({
        "tutorId": "tutor-1", "date": (start + Duration::weeks(2)).to_string(), "time": "14:00"
    }))).await;
    assert_eq!(status, StatusCode::OK);

    let student = token_for("student-1", Role::Student);
    let (status, _) = app.request("POST", "/api/bookings/recurring", Some(&student), Some(json!({
        "tutorId": "tutor-1", "startDate": start.to_string(), "time": "14:00", "weeks": 4
    }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, mine) = app.request("GET", "/api/bookings", Some(&student), None).await;
    assert_eq!(mine, json!([]));
}

#[tokio::test]
async fn series_insert_rolls_back_on_unique_violation() {
    let app = setup().await;
    let date = NaiveDate::from_ymd_opt(2030, 1, 7).unwrap();
    let time = NaiveTime::from_hms_opt(14, 0, 0).unwrap();

    let make = |student: &str| Booking::new(NewBookingParams {
        tutor_id: "tutor-1".into(),
        student_id: student.into(),
        date,
        time,
        amount: 20.0,
        is_trial: false,
        recurring_id: Some("series-1".into()),
    });

    let result = app.state.booking_repo.create_series(&[make("student-1"), make("student-2")]).await;
    let err = result.expect_err("second insert must hit the live-slot index");
    assert!(err.is_unique_violation());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}
