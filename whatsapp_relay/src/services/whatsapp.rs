//! # WhatsApp Reply Clients
//!
//! Text replies through the Twilio Messages API and the Meta Cloud API.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Delivery;
use crate::{config, consts};

/// Text message to send through the Meta Cloud API
#[derive(Debug, Serialize)]
pub struct OutgoingTextMessage {
    /// Messaging product, always "whatsapp"
    pub messaging_product: &'static str,
    /// Recipient's WhatsApp ID (phone number)
    pub to: String,
    #[serde(rename = "type")]
    pub msg_type: &'static str,
    pub text: OutgoingTextContent,
}

impl OutgoingTextMessage {
    pub fn new(to: &str, body: &str) -> Self {
        Self {
            messaging_product: "whatsapp",
            to: to.to_string(),
            msg_type: "text",
            text: OutgoingTextContent {
                body: body.to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OutgoingTextContent {
    pub body: String,
}

/// Response from the Meta messages endpoint
#[derive(Debug, Deserialize)]
pub struct WhatsAppMessageResponse {
    #[serde(default)]
    pub messages: Vec<MessageId>,
}

#[derive(Debug, Deserialize)]
pub struct MessageId {
    pub id: String,
}

/// Response from the Twilio Messages API
#[derive(Debug, Deserialize)]
pub struct TwilioMessageResponse {
    #[serde(default)]
    pub sid: String,
}

async fn error_for_status(response: reqwest::Response, api: &str) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());

    bail!("{api} returned error status {status}: {body}")
}

/// Adds the `whatsapp:` scheme Twilio expects on both addresses
fn twilio_address(number: &str) -> String {
    if number.starts_with(consts::WHATSAPP_ADDRESS_PREFIX) {
        number.to_string()
    } else {
        format!("{}{number}", consts::WHATSAPP_ADDRESS_PREFIX)
    }
}

#[derive(Clone)]
pub struct TwilioClient {
    client: reqwest::Client,
    endpoint: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl TwilioClient {
    pub fn new(credentials: &config::TwilioCredentials<'_>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .context("twilio http client couldnt be built")?,
            endpoint: format!(
                "{}/Accounts/{}/Messages.json",
                consts::TWILIO_API_URL,
                credentials.account_sid
            ),
            account_sid: credentials.account_sid.to_string(),
            auth_token: credentials.auth_token.to_string(),
            from_number: twilio_address(credentials.from_number),
        })
    }

    pub async fn send_text_message(&self, to: &str, body: &str) -> Result<TwilioMessageResponse> {
        let to = twilio_address(to);
        let form = [
            ("To", to.as_str()),
            ("From", self.from_number.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await
            .context("Failed to send request to Twilio API")?;

        error_for_status(response, "Twilio API")
            .await?
            .json()
            .await
            .context("Failed to parse Twilio API response")
    }
}

#[async_trait]
impl super::ReplySender for TwilioClient {
    async fn send_reply(&self, to: &str, body: &str) -> Delivery {
        let result = self.send_text_message(to, body).await;
        if let Ok(response) = &result {
            log::info!("WhatsApp reply sent via Twilio, sid {} to {to}", response.sid);
        }

        Delivery::from_result(result)
    }
}

#[derive(Clone)]
pub struct MetaClient {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl MetaClient {
    pub fn new(credentials: &config::MetaCredentials<'_>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .context("meta http client couldnt be built")?,
            endpoint: format!(
                "{}/{}/messages",
                consts::META_GRAPH_API_URL,
                credentials.phone_number_id
            ),
            access_token: credentials.access_token.to_string(),
        })
    }

    pub async fn send_text_message(&self, to: &str, body: &str) -> Result<WhatsAppMessageResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .json(&OutgoingTextMessage::new(to, body))
            .send()
            .await
            .context("Failed to send request to WhatsApp API")?;

        error_for_status(response, "WhatsApp API")
            .await?
            .json()
            .await
            .context("Failed to parse WhatsApp API response")
    }
}

#[async_trait]
impl super::ReplySender for MetaClient {
    async fn send_reply(&self, to: &str, body: &str) -> Delivery {
        let result = self.send_text_message(to, body).await;
        if let Ok(response) = &result {
            let message_id = response
                .messages
                .first()
                .map(|m| m.id.as_str())
                .unwrap_or_default();
            log::info!("WhatsApp reply sent via Meta API, id {message_id} to {to}");
        }

        Delivery::from_result(result)
    }
}
