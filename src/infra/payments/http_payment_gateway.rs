use crate::domain::models::checkout::{CheckoutRequest, CheckoutSession, RemoteSession};
use crate::domain::ports::PaymentGateway;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::error;

pub struct HttpPaymentGateway {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpPaymentGateway {
    pub fn new(api_url: String, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn read_json<T: DeserializeOwned>(res: Response, user_msg: &str) -> Result<T, AppError> {
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            error!("Payment service failed. Status: {}, Body: {}", status, text);
            return Err(AppError::Upstream(user_msg.to_string()));
        }

        res.json::<T>().await.map_err(|e| {
            error!("Payment service returned an unreadable body: {}", e);
            AppError::Upstream(user_msg.to_string())
        })
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession, AppError> {
        let res = self.client.post(format!("{}/sessions", self.api_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!("Payment service connection error: {}", e);
                AppError::Upstream("Payment session could not be created".into())
            })?;

        Self::read_json(res, "Payment session could not be created").await
    }

    async fn fetch_session(&self, session_id: &str) -> Result<RemoteSession, AppError> {
        let res = self.client.get(format!("{}/sessions/{}", self.api_url, session_id))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| {
                error!("Payment service connection error: {}", e);
                AppError::Upstream("Payment status could not be checked".into())
            })?;

        Self::read_json(res, "Payment status could not be checked").await
    }
}
