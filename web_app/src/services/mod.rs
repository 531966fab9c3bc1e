pub mod crm;
pub mod notification;
pub mod zoho;

use crate::models;
use async_trait::async_trait;

/// Result of a best-effort side effect.
///
/// Callers log it and move on, a failure here never fails the request that
/// triggered it.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T = ()> {
    Done(T),
    /// The feature has no credentials configured, nothing was attempted
    NotConfigured,
    /// The downstream service could not be reached or rejected the call
    Failed(String),
}

impl<T> Outcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }

    /// Turns an attempted operation into an outcome, keeping the whole error chain
    pub fn from_result(result: anyhow::Result<T>) -> Self {
        match result {
            Ok(value) => Outcome::Done(value),
            Err(e) => Outcome::Failed(format!("{e:#}")),
        }
    }

    /// Short label used for metrics
    pub fn status(&self) -> &'static str {
        match self {
            Outcome::Done(_) => "done",
            Outcome::NotConfigured => "not_configured",
            Outcome::Failed(_) => "failed",
        }
    }

    /// Logs the outcome of `operation`
    pub fn log(&self, operation: &str) {
        match self {
            Outcome::Done(_) => {
                tracing::info!("{} completed", operation);
            }
            Outcome::NotConfigured => {
                tracing::info!("{} skipped: service not configured", operation);
            }
            Outcome::Failed(reason) => {
                logfire::error!(
                    "{operation} failed: {reason}",
                    operation = operation.to_string(),
                    reason = reason.clone()
                );
            }
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationService {
    async fn notify_email_subscription(
        &self,
        subscription: &models::subscription::EmailSubscription,
    ) -> Outcome;

    async fn notify_call_request(&self, call_request: &models::call_request::CallRequest)
    -> Outcome;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CrmService {
    /// Creates a lead for the call request. On success returns the CRM reference
    /// of the new lead (record id or RPC result).
    async fn create_lead(&self, call_request: &models::call_request::CallRequest)
    -> Outcome<String>;
}

pub type ImplNotificationService = Box<dyn NotificationService>;
pub type ImplCrmService = Box<dyn CrmService>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_result() {
        let done: Outcome<u8> = Outcome::from_result(Ok(1));
        assert_eq!(done, Outcome::Done(1));
        assert!(done.is_done());

        let failed: Outcome<u8> =
            Outcome::from_result(Err(anyhow::anyhow!("refused").context("crm unreachable")));
        assert_eq!(failed, Outcome::Failed("crm unreachable: refused".to_string()));
        assert_eq!(failed.status(), "failed");
    }

    #[test]
    fn test_outcome_status_labels() {
        assert_eq!(Outcome::<()>::NotConfigured.status(), "not_configured");
        assert_eq!(Outcome::Done(()).status(), "done");
    }
}
