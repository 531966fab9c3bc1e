use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::consts;

/// Validated call request fields, before the store assigns identity
#[derive(Debug, Clone, PartialEq)]
pub struct NewCallRequest {
    pub name: String,
    pub phone_number: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    pub id: Uuid,
    pub name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<NewCallRequest> for CallRequest {
    fn from(val: NewCallRequest) -> Self {
        CallRequest {
            id: Uuid::new_v4(),
            name: val.name,
            phone_number: val.phone_number,
            email: val.email,
            created_at: Utc::now(),
        }
    }
}

impl CallRequest {
    /// Splits the submitted name into the first/last name pair a CRM lead needs.
    ///
    /// The first word is the first name and the rest the last name. Single word
    /// names get [`consts::CRM_DEFAULT_LAST_NAME`] as last name.
    pub fn lead_name_parts(&self) -> (String, String) {
        let mut words = self.name.split_whitespace();
        let first_name = words.next().unwrap_or_default().to_string();
        let last_name = words.collect::<Vec<_>>().join(" ");

        if last_name.is_empty() {
            return (first_name, consts::CRM_DEFAULT_LAST_NAME.to_string());
        }

        (first_name, last_name)
    }
}
