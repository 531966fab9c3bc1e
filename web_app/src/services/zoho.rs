//! Direct Zoho CRM lead creation.
//!
//! Used instead of the MCP server when the Zoho OAuth credentials are
//! configured. Access tokens come from the refresh token grant and are cached
//! until shortly before they expire.

use anyhow::{Context, anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oauth2::{
    AuthType, ClientId, ClientSecret, RefreshToken, TokenResponse, TokenUrl, basic::BasicClient,
};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;

use crate::{config, consts, metric, models, services::Outcome};

const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

#[derive(Debug, Serialize)]
pub struct ZohoLead {
    #[serde(rename = "First_Name")]
    pub first_name: String,
    #[serde(rename = "Last_Name")]
    pub last_name: String,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "Email", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "Lead_Source")]
    pub lead_source: &'static str,
    #[serde(rename = "Lead_Status")]
    pub lead_status: &'static str,
    #[serde(rename = "Description")]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct ZohoLeadEnvelope {
    pub data: Vec<ZohoLead>,
    pub trigger: [&'static str; 3],
}

impl From<&models::call_request::CallRequest> for ZohoLeadEnvelope {
    fn from(call_request: &models::call_request::CallRequest) -> Self {
        let (first_name, last_name) = call_request.lead_name_parts();

        ZohoLeadEnvelope {
            data: vec![ZohoLead {
                first_name,
                last_name,
                phone: call_request.phone_number.clone(),
                email: call_request.email.clone(),
                lead_source: consts::CRM_LEAD_SOURCE,
                lead_status: "New",
                description: format!(
                    "Call request submitted on {}",
                    call_request.created_at.to_rfc3339()
                ),
            }],
            trigger: ["workflow", "approval", "blueprint"],
        }
    }
}

#[derive(Debug, Deserialize)]
struct ZohoResponse {
    #[serde(default)]
    data: Vec<ZohoRecordResult>,
}

#[derive(Debug, Deserialize)]
struct ZohoRecordResult {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: serde_json::Value,
}

/// Reads the Leads API reply and returns the id of the created record
pub fn interpret_zoho_response(status: StatusCode, body: &str) -> anyhow::Result<String> {
    if !status.is_success() {
        bail!("zoho returned error status {status}: {body}");
    }

    let response: ZohoResponse =
        serde_json::from_str(body).context("zoho returned a malformed body")?;

    let record = response
        .data
        .into_iter()
        .next()
        .context("zoho response has no record result")?;

    if record.status != "success" {
        bail!("zoho rejected the lead: {}", record.message);
    }

    Ok(record
        .details
        .get("id")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string())
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ZohoCrmHandler {
    client: reqwest::Client,
    /// oauth requests must not follow redirects
    token_client: reqwest::Client,
    api_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    token: Arc<Mutex<Option<CachedToken>>>,
}

impl ZohoCrmHandler {
    pub fn new(
        api_url: &str,
        token_url: &str,
        credentials: &config::ZohoCredentials<'_>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .context("zoho http client couldnt be built")?,
            token_client: reqwest::Client::builder()
                .timeout(timeout)
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .context("zoho oauth client couldnt be built")?,
            api_url: api_url.trim_end_matches('/').to_string(),
            token_url: token_url.to_string(),
            client_id: credentials.client_id.to_string(),
            client_secret: credentials.client_secret.to_string(),
            refresh_token: credentials.refresh_token.to_string(),
            token: Arc::new(Mutex::new(None)),
        })
    }

    async fn access_token(&self) -> anyhow::Result<String> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| t.expires_at > Utc::now()) {
            return Ok(token.access_token.clone());
        }

        let oauth_client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.client_secret.clone()))
            .set_token_uri(TokenUrl::new(self.token_url.clone())?)
            .set_auth_type(AuthType::RequestBody);

        let response = oauth_client
            .exchange_refresh_token(&RefreshToken::new(self.refresh_token.clone()))
            .request_async(&self.token_client)
            .await
            .map_err(|e| anyhow!("zoho access token couldnt be refreshed: {e}"))?;

        let lifetime = chrono::Duration::from_std(
            response.expires_in().unwrap_or(DEFAULT_TOKEN_LIFETIME),
        )?;
        let token = CachedToken {
            access_token: response.access_token().secret().clone(),
            expires_at: Utc::now() + lifetime
                - chrono::Duration::seconds(consts::CRM_TOKEN_EXPIRY_MARGIN_SECS),
        };

        tracing::info!("zoho access token refreshed");
        *cached = Some(token.clone());

        Ok(token.access_token)
    }

    async fn send_create_lead(
        &self,
        call_request: &models::call_request::CallRequest,
    ) -> anyhow::Result<String> {
        let token = self.access_token().await?;

        let response = self
            .client
            .post(format!("{}/Leads", self.api_url))
            .header("Authorization", format!("Zoho-oauthtoken {token}"))
            .json(&ZohoLeadEnvelope::from(call_request))
            .send()
            .await
            .context("Failed to send request to Zoho CRM")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response body".to_string());

        interpret_zoho_response(status, &body)
    }
}

#[async_trait]
impl crate::services::CrmService for ZohoCrmHandler {
    async fn create_lead(
        &self,
        call_request: &models::call_request::CallRequest,
    ) -> Outcome<String> {
        let outcome = Outcome::from_result(self.send_create_lead(call_request).await);
        metric::incr_crm_status_statds(outcome.status());
        outcome
    }
}
