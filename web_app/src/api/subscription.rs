//! # Subscription API Module
//!
//! Email subscriptions for Ruka product updates.

use crate::{metric, models, repo, services};

/// Result of a subscribe attempt
#[derive(Debug, PartialEq)]
pub enum SubscribeOutcome {
    Subscribed(models::subscription::EmailSubscription),
    /// The email was already stored, nothing was created
    AlreadySubscribed,
}

/// Subscribes an email to product updates.
///
/// Looks the email up first and stops when it is already stored. The insert
/// itself also refuses an existing email, so two concurrent requests for the
/// same address create one subscription. New subscriptions trigger a
/// best-effort notification to the team.
///
/// # Arguments
/// * `repo` - Repository holding the subscriptions
/// * `notification_service` - Service announcing the new subscriber
/// * `email` - Validated, trimmed email address
///
/// # Errors
/// Returns an error only when the repository fails.
pub async fn subscribe(
    repo: &repo::ImplLeadRepo,
    notification_service: &services::ImplNotificationService,
    email: &str,
) -> anyhow::Result<SubscribeOutcome> {
    if repo.get_email_subscription(email).await?.is_some() {
        metric::incr_lead_action_statds("duplicate_subscription");
        return Ok(SubscribeOutcome::AlreadySubscribed);
    }

    let Some(subscription) = repo.create_email_subscription_if_absent(email).await? else {
        // stored by a concurrent request since the lookup
        metric::incr_lead_action_statds("duplicate_subscription");
        return Ok(SubscribeOutcome::AlreadySubscribed);
    };
    metric::incr_lead_action_statds("email_subscription");

    notification_service
        .notify_email_subscription(&subscription)
        .await
        .log("email subscription notification");

    Ok(SubscribeOutcome::Subscribed(subscription))
}
