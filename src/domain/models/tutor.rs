use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Tutor {
    pub id: String,
    pub display_name: String,
    pub hourly_rate: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tutor {
    pub fn new(id: String, display_name: String, hourly_rate: f64) -> Self {
        let now = Utc::now();
        Self {
            id,
            display_name,
            hourly_rate,
            created_at: now,
            updated_at: now,
        }
    }
}
