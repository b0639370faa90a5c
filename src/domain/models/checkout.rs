use serde::{Deserialize, Serialize};

/// Outbound request for a hosted payment page.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub reference: String,
    pub amount: f64,
    pub currency: String,
    pub description: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// Session state as reported by the payment processor.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RemoteSessionStatus {
    Open,
    Paid,
    Failed,
    Expired,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RemoteSession {
    pub id: String,
    pub status: RemoteSessionStatus,
}
