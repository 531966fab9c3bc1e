//! Landing page form endpoints.
//!
//! Bodies are read as raw bytes so malformed JSON gets the same 400 payload
//! as a failed validation.

use ntex::{util::Bytes, web};
use serde_json::json;

use crate::{
    api, consts,
    front::{
        AppState,
        errors::ApiError,
        forms::lead::{CallRequestForm, EmailSubscriptionForm, parse_body},
    },
};

/// Subscribes an email to product updates
#[web::post("/email-subscription")]
pub async fn create_email_subscription(
    body: Bytes,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let valid = parse_body::<EmailSubscriptionForm>(&body)
        .and_then(EmailSubscriptionForm::validate)
        .map_err(ApiError::from)?;

    let outcome =
        api::subscription::subscribe(&app_state.repo, &app_state.notification_service, &valid.email)
            .await
            .map_err(|e| ApiError::unhandled(consts::SUBSCRIPTION_FAILED_MESSAGE, e))?;

    match outcome {
        api::subscription::SubscribeOutcome::AlreadySubscribed => {
            Err(ApiError::DuplicateSubscription.into())
        }
        api::subscription::SubscribeOutcome::Subscribed(subscription) => {
            Ok(web::HttpResponse::Created().json(&json!({
                "message": consts::SUBSCRIBED_MESSAGE,
                "subscription": { "email": subscription.email },
            })))
        }
    }
}

/// Stores a call-back request and hands it to the CRM
#[web::post("/call-request")]
pub async fn create_call_request(
    body: Bytes,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let new_request = parse_body::<CallRequestForm>(&body)
        .and_then(CallRequestForm::validate)
        .map_err(ApiError::from)?;

    let call_request = api::call_request::request_call(
        &app_state.repo,
        &app_state.crm_service,
        &app_state.notification_service,
        new_request,
    )
    .await
    .map_err(|e| ApiError::unhandled(consts::CALL_REQUEST_FAILED_MESSAGE, e))?;

    Ok(web::HttpResponse::Created().json(&json!({
        "message": consts::CALL_REQUEST_RECEIVED_MESSAGE,
        "callRequest": {
            "phoneNumber": call_request.phone_number,
            "email": call_request.email,
        },
    })))
}
