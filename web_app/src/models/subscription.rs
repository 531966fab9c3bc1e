use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmailSubscription {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl EmailSubscription {
    pub fn create_from_email(email: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            created_at: Utc::now(),
        }
    }
}
