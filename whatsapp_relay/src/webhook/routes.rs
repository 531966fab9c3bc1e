//! WhatsApp webhook endpoint handlers
//!
//! Vendors retry any webhook that doesn't get a 200, so the POST endpoints
//! answer 200 whatever happened to the message, unparseable bodies included.

use super::{handler, schemas};
use crate::{consts, server::RelayState};
use ntex::{util::Bytes, web};
use serde::Deserialize;

/// Query parameters of the Meta webhook verification
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode", default)]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token", default)]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge", default)]
    pub challenge: Option<String>,
}

impl VerifyQuery {
    /// The mode must be present and the token must equal the configured one
    pub fn is_verified_by(&self, expected_token: Option<&str>) -> bool {
        let mode_present = self.mode.as_deref().is_some_and(|m| !m.is_empty());

        match (expected_token, self.verify_token.as_deref()) {
            (Some(expected), Some(token)) => mode_present && token == expected,
            _ => false,
        }
    }
}

fn acknowledge_webhook() -> web::HttpResponse {
    web::HttpResponse::Ok()
        .content_type("text/plain")
        .body(consts::WEBHOOK_ACK_BODY)
}

/// Twilio webhook receiver (POST, form encoded)
#[web::post("/twilio")]
pub async fn receive_twilio(
    body: Bytes,
    state: web::types::State<RelayState>,
) -> impl web::Responder {
    let message = match serde_urlencoded::from_bytes::<schemas::TwilioInbound>(&body) {
        Ok(form) => form.into_message(),
        Err(e) => {
            log::error!("Failed to parse Twilio webhook form: {e}");
            None
        }
    };

    match message {
        Some(message) => {
            let outcome =
                handler::relay_inbound_message(&message, &state.submitter, state.twilio.as_ref())
                    .await;
            log::info!("Twilio message from {} relayed: {outcome:?}", message.sender);
        }
        None => log::warn!("Twilio webhook without a sender, ignoring"),
    }

    acknowledge_webhook()
}

/// Meta Cloud API webhook receiver (POST, JSON)
#[web::post("/meta")]
pub async fn receive_meta(
    body: Bytes,
    state: web::types::State<RelayState>,
) -> impl web::Responder {
    let payload: schemas::WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            log::error!("Failed to parse Meta webhook payload: {e}");
            return acknowledge_webhook();
        }
    };

    for message in payload.into_messages() {
        let outcome =
            handler::relay_inbound_message(&message, &state.submitter, state.meta.as_ref()).await;
        log::info!("Meta message from {} relayed: {outcome:?}", message.sender);
    }

    acknowledge_webhook()
}

/// Meta webhook verification (GET)
///
/// # Returns
/// - 200 with the challenge when the verify token matches
/// - 403 otherwise, always when no verify token is configured
#[web::get("/meta")]
pub async fn verify_meta(
    query: web::types::Query<VerifyQuery>,
    state: web::types::State<RelayState>,
) -> impl web::Responder {
    if !query.is_verified_by(state.verify_token.as_deref()) {
        log::error!("Meta webhook verification failed");
        return web::HttpResponse::Forbidden()
            .content_type("text/plain")
            .body("Forbidden");
    }

    log::info!("Meta webhook verified");
    web::HttpResponse::Ok()
        .content_type("text/plain")
        .body(query.challenge.clone().unwrap_or_default())
}

/// Configures webhook routes for both vendors.
///
/// # Routes
/// - `POST /webhook/whatsapp/twilio` - Twilio webhook receiver
/// - `POST /webhook/whatsapp/meta` - Meta webhook receiver
/// - `GET /webhook/whatsapp/meta` - Meta webhook verification
pub fn whatsapp(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/webhook/whatsapp").service((receive_twilio, receive_meta, verify_meta)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{Delivery, MockLeadSubmitter, MockReplySender};
    use ntex::{http::StatusCode, web::test};

    fn relay_state(submitter: MockLeadSubmitter, verify_token: Option<&str>) -> RelayState {
        RelayState {
            submitter: Box::new(submitter),
            twilio: None,
            meta: None,
            verify_token: verify_token.map(str::to_string),
            landing_url: "http://localhost:8080".to_string(),
        }
    }

    async fn call(state: RelayState, req: test::TestRequest) -> (StatusCode, String) {
        let app =
            test::init_service(web::App::new().state(state).configure(whatsapp)).await;
        let resp = test::call_service(&app, req.to_request()).await;
        let status = resp.status();
        let body = test::read_body(resp).await;

        (status, String::from_utf8_lossy(&body).to_string())
    }

    #[test]
    fn test_verify_query_deserialization() {
        let json = r#"{"hub.mode":"subscribe","hub.verify_token":"test123","hub.challenge":"challenge123"}"#;
        let query: VerifyQuery = serde_json::from_str(json).unwrap();

        assert!(query.is_verified_by(Some("test123")));
        assert!(!query.is_verified_by(Some("other")));
        assert!(!query.is_verified_by(None));
    }

    #[ntex::test]
    async fn test_verify_meta_echoes_challenge() {
        let (status, body) = call(
            relay_state(MockLeadSubmitter::new(), Some("s3cret")),
            test::TestRequest::get().uri(
                "/webhook/whatsapp/meta?hub.mode=subscribe&hub.verify_token=s3cret&hub.challenge=123",
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "123");
    }

    #[ntex::test]
    async fn test_verify_meta_rejects_wrong_or_unset_token() {
        let uri = "/webhook/whatsapp/meta?hub.mode=subscribe&hub.verify_token=wrong&hub.challenge=123";

        let (status, _) = call(
            relay_state(MockLeadSubmitter::new(), Some("s3cret")),
            test::TestRequest::get().uri(uri),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(
            relay_state(MockLeadSubmitter::new(), None),
            test::TestRequest::get().uri(uri),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(
            relay_state(MockLeadSubmitter::new(), Some("s3cret")),
            test::TestRequest::get()
                .uri("/webhook/whatsapp/meta?hub.verify_token=s3cret&hub.challenge=123"),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[ntex::test]
    async fn test_twilio_ad_message_is_forwarded() {
        let mut mock_submitter = MockLeadSubmitter::new();
        mock_submitter
            .expect_submit_lead()
            .withf(|lead| lead.phone_number == "+919876543210" && lead.name == "Asha")
            .times(1)
            .returning(|_| Delivery::Done);

        let mut mock_reply = MockReplySender::new();
        mock_reply
            .expect_send_reply()
            .times(1)
            .returning(|_, _| Delivery::Done);
        let mut state = relay_state(mock_submitter, None);
        state.twilio = Some(Box::new(mock_reply));

        let (status, body) = call(
            state,
            test::TestRequest::post()
                .uri("/webhook/whatsapp/twilio")
                .header("content-type", "application/x-www-form-urlencoded")
                .set_payload("From=whatsapp%3A%2B919876543210&Body=igoffer+my+name+is+Asha"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[ntex::test]
    async fn test_webhooks_answer_ok_on_garbage() {
        let mut mock_submitter = MockLeadSubmitter::new();
        mock_submitter.expect_submit_lead().never();

        let (status, _) = call(
            relay_state(mock_submitter, None),
            test::TestRequest::post()
                .uri("/webhook/whatsapp/meta")
                .set_payload("{not json"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let mut mock_submitter = MockLeadSubmitter::new();
        mock_submitter.expect_submit_lead().never();

        let (status, _) = call(
            relay_state(mock_submitter, None),
            test::TestRequest::post()
                .uri("/webhook/whatsapp/twilio")
                .set_payload("Body=no+sender"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[ntex::test]
    async fn test_meta_organic_message_is_not_forwarded() {
        let mut mock_submitter = MockLeadSubmitter::new();
        mock_submitter.expect_submit_lead().never();

        let payload = serde_json::json!({
            "entry": [{"changes": [{"value": {
                "contacts": [{"profile": {"name": "Asha"}, "wa_id": "919876543210"}],
                "messages": [{"from": "919876543210", "type": "text", "text": {"body": "Hi, what are your hours?"}}]
            }}]}]
        });

        let (status, _) = call(
            relay_state(mock_submitter, None),
            test::TestRequest::post()
                .uri("/webhook/whatsapp/meta")
                .set_json(&payload),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
    }
}
