//! # Call Request API Module
//!
//! Call-back requests. Every stored request is relayed to the CRM, which
//! schedules the automated call, and announced by email to the team.

use crate::{metric, models, repo, services};

/// Stores a call request and runs its best-effort side effects.
///
/// The CRM call is awaited inline, its client timeout bounds how long a slow
/// CRM can hold the response. Neither the CRM nor the notification outcome
/// changes the result once the request is stored.
///
/// # Arguments
/// * `repo` - Repository holding the call requests
/// * `crm_service` - CRM relay creating the lead
/// * `notification_service` - Service announcing the request
/// * `new_request` - Validated request fields
///
/// # Errors
/// Returns an error only when the repository fails.
pub async fn request_call(
    repo: &repo::ImplLeadRepo,
    crm_service: &services::ImplCrmService,
    notification_service: &services::ImplNotificationService,
    new_request: models::call_request::NewCallRequest,
) -> anyhow::Result<models::call_request::CallRequest> {
    let call_request = repo.create_call_request(new_request).await?;
    metric::incr_lead_action_statds("call_request");

    let crm_outcome = crm_service.create_lead(&call_request).await;
    crm_outcome.log("crm lead creation");
    if crm_outcome.is_done() {
        metric::incr_lead_action_statds("crm_lead_created");
        logfire::info!(
            "CRM lead created for call request {id}",
            id = call_request.id.to_string()
        );
    } else {
        metric::incr_lead_action_statds("crm_lead_failed");
        logfire::warn!(
            "CRM lead not created, call request {id} was stored anyway",
            id = call_request.id.to_string()
        );
    }

    notification_service
        .notify_call_request(&call_request)
        .await
        .log("call request notification");

    Ok(call_request)
}
