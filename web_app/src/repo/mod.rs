pub mod memory;

use crate::models;
use async_trait::async_trait;
use uuid::Uuid;

/// Storage for the submitted leads.
///
/// Plain `create_*` operations insert unconditionally. Subscriptions that must
/// stay unique go through [`create_email_subscription_if_absent`](LeadRepo::create_email_subscription_if_absent).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeadRepo {
    async fn create_email_subscription(
        &self,
        email: &str,
    ) -> anyhow::Result<models::subscription::EmailSubscription>;

    /// Checks and inserts in one step: `None` when the email is already
    /// subscribed, the stored record is left untouched
    async fn create_email_subscription_if_absent(
        &self,
        email: &str,
    ) -> anyhow::Result<Option<models::subscription::EmailSubscription>>;

    async fn get_email_subscription(
        &self,
        email: &str,
    ) -> anyhow::Result<Option<models::subscription::EmailSubscription>>;

    async fn create_call_request(
        &self,
        request: models::call_request::NewCallRequest,
    ) -> anyhow::Result<models::call_request::CallRequest>;

    async fn get_call_request(
        &self,
        id: Uuid,
    ) -> anyhow::Result<Option<models::call_request::CallRequest>>;

    /// Most recent call requests, newest first, capped at
    /// [`RECENT_CALL_REQUESTS_LIMIT`](crate::consts::RECENT_CALL_REQUESTS_LIMIT)
    async fn list_recent_call_requests(
        &self,
    ) -> anyhow::Result<Vec<models::call_request::CallRequest>>;
}

pub type ImplLeadRepo = Box<dyn LeadRepo>;
