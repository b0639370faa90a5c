mod common;

use axum::http::StatusCode;
use chrono::{Duration, NaiveDate, NaiveTime, Utc, Weekday};
use common::{token_for, upcoming, TestApp, WEBHOOK_SECRET};
use serde_json::{json, Value};
use tower::ServiceExt;
use tutoring_backend::{
    background::{sweep_stale_pending, BackgroundWorker},
    domain::{
        models::{auth::Role, booking::{Booking, NewBookingParams, PaymentStatus}, checkout::RemoteSessionStatus},
        services::payment_service::sign_payload,
    },
};

fn booking_at(hour: u32, age_minutes: i64) -> Booking {
    let mut booking = Booking::new(NewBookingParams {
        tutor_id: "tutor-1".into(),
        student_id: "student-1".into(),
        date: NaiveDate::from_ymd_opt(2030, 1, 7).unwrap(),
        time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
        amount: 20.0,
        is_trial: false,
        recurring_id: None,
    });
    booking.created_at = Utc::now() - Duration::minutes(age_minutes);
    booking
}

#[tokio::test]
async fn sweep_deletes_only_stale_pending_bookings() {
    let app = TestApp::new().await;
    app.seed_tutor("tutor-1", 20.0, json!({ "monday": ["09:00", "10:00", "11:00"] })).await;
    let repo = &app.state.booking_repo;

    let stale = repo.create(&booking_at(9, 120)).await.unwrap();
    let fresh = repo.create(&booking_at(10, 1)).await.unwrap();
    let paid = repo.create(&booking_at(11, 120)).await.unwrap();
    repo.settle_payment(&[paid.id.clone()], PaymentStatus::Paid).await.unwrap();

    let deleted = sweep_stale_pending(&app.state).await.unwrap();
    assert_eq!(deleted, 1);

    assert!(repo.find_by_id(&stale.id).await.unwrap().is_none());
    assert!(repo.find_by_id(&fresh.id).await.unwrap().is_some());
    assert!(repo.find_by_id(&paid.id).await.unwrap().is_some());

    assert_eq!(sweep_stale_pending(&app.state).await.unwrap(), 0);
}

/// Books the Monday 14:00 slot and opens a checkout for it, then ages the row past the TTL.
async fn stale_checkout(app: &TestApp, student: &str) -> (String, Value) {
    let (status, booking) = app.request("POST", "/api/bookings", Some(student), Some(json!({
        "tutorId": "tutor-1", "date": upcoming(Weekday::Mon).to_string(), "time": "14:00"
    }))).await;
    assert_eq!(status, StatusCode::OK, "{}", booking);
    let booking_id = booking["id"].as_str().unwrap().to_string();

    let (status, session) = app.request("POST", "/api/checkout/create-session", Some(student), Some(json!({
        "bookingId": booking_id
    }))).await;
    assert_eq!(status, StatusCode::OK, "{}", session);

    sqlx::query("UPDATE bookings SET created_at = ? WHERE id = ?")
        .bind(Utc::now() - Duration::minutes(31))
        .bind(&booking_id)
        .execute(&app.pool)
        .await
        .unwrap();
    (booking_id, session)
}

#[tokio::test]
async fn sweep_keeps_bookings_with_a_checkout_session() {
    let app = TestApp::new().await;
    app.seed_tutor("tutor-1", 20.0, json!({ "monday": ["14:00"] })).await;
    let student = token_for("student-1", Role::Student);
    let (booking_id, session) = stale_checkout(&app, &student).await;

    // Processor unreachable: the row is left alone.
    assert_eq!(sweep_stale_pending(&app.state).await.unwrap(), 0);
    app.gateway.set_remote_status(RemoteSessionStatus::Open);
    assert_eq!(sweep_stale_pending(&app.state).await.unwrap(), 0);

    let stored = app.state.booking_repo.find_by_id(&booking_id).await.unwrap().unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Pending);

    // The payment completes after the TTL and still lands.
    let payload = json!({ "sessionId": session["sessionId"], "bookingId": booking_id, "status": "paid" });
    let body = payload.to_string();
    let signature = sign_payload(WEBHOOK_SECRET, body.as_bytes());
    let response = app.router.clone().oneshot(
        axum::http::Request::builder()
            .method("POST")
            .uri("/api/checkout/webhook")
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .header("X-Payment-Signature", signature)
            .body(axum::body::Body::from(body))
            .unwrap()
    ).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stored = app.state.booking_repo.find_by_id(&booking_id).await.unwrap().unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Paid);
}

#[tokio::test]
async fn sweep_settles_stale_checkouts_from_the_processor() {
    let app = TestApp::new().await;
    app.seed_tutor("tutor-1", 20.0, json!({ "monday": ["14:00"] })).await;
    let student = token_for("student-1", Role::Student);
    let (booking_id, _) = stale_checkout(&app, &student).await;

    app.gateway.set_remote_status(RemoteSessionStatus::Expired);
    assert_eq!(sweep_stale_pending(&app.state).await.unwrap(), 0);

    let stored = app.state.booking_repo.find_by_id(&booking_id).await.unwrap().unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Failed);

    // An expired checkout no longer holds the slot.
    let other = token_for("student-2", Role::Student);
    let (status, _) = app.request("POST", "/api/bookings", Some(&other), Some(json!({
        "tutorId": "tutor-1", "date": upcoming(Weekday::Mon).to_string(), "time": "14:00"
    }))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn worker_stops_on_request() {
    let app = TestApp::new().await;
    let worker = BackgroundWorker::start(app.state.clone());

    tokio::time::timeout(std::time::Duration::from_secs(5), worker.stop())
        .await
        .expect("worker should stop promptly");
}
