#![allow(dead_code)]

use tutoring_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    infra::repositories::{
        sqlite_availability_repo::SqliteAvailabilityRepo,
        sqlite_booking_repo::SqliteBookingRepo,
        sqlite_student_repo::SqliteStudentRepo,
        sqlite_tutor_repo::SqliteTutorRepo,
    },
    domain::models::{
        auth::{Claims, Role},
        checkout::{CheckoutRequest, CheckoutSession, RemoteSession, RemoteSessionStatus},
    },
    domain::ports::PaymentGateway,
    error::AppError,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, header, StatusCode},
    Router,
};
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use std::str::FromStr;
use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header, Algorithm};
use tower::ServiceExt;
use serde_json::{json, Value};

pub const TEST_ISSUER: &str = "https://auth.test";
pub const TEST_AUDIENCE: &str = "tutoring-test";
pub const WEBHOOK_SECRET: &str = "whsec_test";

/// Records every session request and answers with whatever the test configured.
#[derive(Default)]
pub struct MockPaymentGateway {
    pub fail_create: Mutex<bool>,
    pub remote_status: Mutex<Option<RemoteSessionStatus>>,
    pub requests: Mutex<Vec<CheckoutRequest>>,
}

impl MockPaymentGateway {
    pub fn set_fail_create(&self, fail: bool) {
        *self.fail_create.lock().unwrap() = fail;
    }

    pub fn set_remote_status(&self, status: RemoteSessionStatus) {
        *self.remote_status.lock().unwrap() = Some(status);
    }

    pub fn last_request(&self) -> Option<CheckoutRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession, AppError> {
        if *self.fail_create.lock().unwrap() {
            return Err(AppError::Upstream("Payment session could not be created".into()));
        }
        self.requests.lock().unwrap().push(request.clone());
        let id = format!("cs_{}", Uuid::new_v4().simple());
        Ok(CheckoutSession {
            url: format!("https://pay.test/{}", id),
            id,
        })
    }

    async fn fetch_session(&self, session_id: &str) -> Result<RemoteSession, AppError> {
        match *self.remote_status.lock().unwrap() {
            Some(status) => Ok(RemoteSession { id: session_id.to_string(), status }),
            None => Err(AppError::Upstream("Payment status could not be checked".into())),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub gateway: Arc<MockPaymentGateway>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_public_key: pub_key_pem.to_string(),
            auth_issuer: TEST_ISSUER.to_string(),
            auth_audience: TEST_AUDIENCE.to_string(),
            payment_service_url: "http://localhost".to_string(),
            payment_service_token: "token".to_string(),
            payment_webhook_secret: WEBHOOK_SECRET.to_string(),
            checkout_success_url: "http://localhost:5173/payment/success".to_string(),
            checkout_cancel_url: "http://localhost:5173/payment/cancelled".to_string(),
            currency: "usd".to_string(),
            trial_price: 5.0,
            pending_booking_ttl_minutes: 30,
            sweep_interval_secs: 3600,
        };

        let gateway = Arc::new(MockPaymentGateway::default());

        let state = Arc::new(AppState::new(
            config,
            Arc::new(SqliteTutorRepo::new(pool.clone())),
            Arc::new(SqliteAvailabilityRepo::new(pool.clone())),
            Arc::new(SqliteBookingRepo::new(pool.clone())),
            Arc::new(SqliteStudentRepo::new(pool.clone())),
            gateway.clone(),
        ));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            gateway,
        }
    }

    pub async fn request(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        (status, parse_body(response).await)
    }

    /// Creates a tutor profile with the given rate and weekly slots.
    pub async fn seed_tutor(&self, tutor_id: &str, hourly_rate: f64, availability: Value) -> String {
        let token = token_for(tutor_id, Role::Tutor);
        let (status, body) = self.request("PUT", "/api/tutor/profile", Some(&token), Some(json!({
            "displayName": format!("Tutor {}", tutor_id),
            "hourlyRate": hourly_rate
        }))).await;
        assert_eq!(status, StatusCode::OK, "profile: {}", body);

        let (status, body) = self.request("PUT", "/api/tutor/availability", Some(&token), Some(json!({
            "availability": availability
        }))).await;
        assert_eq!(status, StatusCode::OK, "availability: {}", body);
        token
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

pub fn token_for(sub: &str, role: Role) -> String {
    let claims = Claims {
        iss: TEST_ISSUER.to_string(),
        sub: sub.to_string(),
        aud: TEST_AUDIENCE.to_string(),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        role,
    };
    let key = EncodingKey::from_ed_pem(include_bytes!("../tests/keys/test_private.pem")).unwrap();
    encode(&Header::new(Algorithm::EdDSA), &claims, &key).unwrap()
}

pub async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

/// The given weekday at least a week from today, so lessons are always in the future.
pub fn upcoming(weekday: Weekday) -> NaiveDate {
    let mut date = Utc::now().date_naive() + Duration::days(7);
    while date.weekday() != weekday {
        date += Duration::days(1);
    }
    date
}
