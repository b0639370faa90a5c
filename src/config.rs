use std::env;
use std::str::FromStr;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_public_key: String, // Identity provider's Ed25519 public key (PEM)
    pub auth_issuer: String,
    pub auth_audience: String,
    pub payment_service_url: String,
    pub payment_service_token: String,
    pub payment_webhook_secret: String,
    pub checkout_success_url: String,
    pub checkout_cancel_url: String,
    pub currency: String,
    pub trial_price: f64,
    pub pending_booking_ttl_minutes: i64,
    pub sweep_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: parse_or("PORT", 3000),
            jwt_public_key: env::var("JWT_PUBLIC_KEY").expect("JWT_PUBLIC_KEY must be set (Ed25519 Public Key)"),
            auth_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "https://auth.tutoring.local".to_string()),
            auth_audience: env::var("AUTH_AUDIENCE").unwrap_or_else(|_| "tutoring-frontend".to_string()),
            payment_service_url: env::var("PAYMENT_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8100/api/v1".to_string()),
            payment_service_token: env::var("PAYMENT_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            payment_webhook_secret: env::var("PAYMENT_WEBHOOK_SECRET").expect("PAYMENT_WEBHOOK_SECRET must be set"),
            checkout_success_url: env::var("CHECKOUT_SUCCESS_URL").unwrap_or_else(|_| "http://localhost:5173/payment/success".to_string()),
            checkout_cancel_url: env::var("CHECKOUT_CANCEL_URL").unwrap_or_else(|_| "http://localhost:5173/payment/cancelled".to_string()),
            currency: env::var("CURRENCY").unwrap_or_else(|_| "usd".to_string()),
            trial_price: parse_or("TRIAL_PRICE", 5.0),
            pending_booking_ttl_minutes: parse_or("PENDING_BOOKING_TTL_MINUTES", 30),
            sweep_interval_secs: parse_or("SWEEP_INTERVAL_SECS", 60),
        }
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| panic!("{} has an invalid value: {}", key, raw)),
        Err(_) => default,
    }
}
