pub mod landing;
pub mod whatsapp;

use async_trait::async_trait;
use serde::Serialize;

/// Result of an outbound call made while relaying a message.
///
/// Never turned into an error: the webhook is acknowledged whatever happens.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Done,
    /// The channel has no credentials configured, nothing was sent
    NotConfigured,
    Failed(String),
}

impl Delivery {
    pub fn from_result<T>(result: anyhow::Result<T>) -> Self {
        match result {
            Ok(_) => Delivery::Done,
            Err(e) => Delivery::Failed(format!("{e:#}")),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Delivery::Done)
    }
}

/// Body of the landing page call request endpoint
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeadSubmission {
    pub name: String,
    pub phone_number: String,
    /// empty when the message had no email
    pub email: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeadSubmitter {
    async fn submit_lead(&self, lead: &LeadSubmission) -> Delivery;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReplySender {
    async fn send_reply(&self, to: &str, body: &str) -> Delivery;
}

pub type ImplLeadSubmitter = Box<dyn LeadSubmitter>;
pub type ImplReplySender = Box<dyn ReplySender>;
