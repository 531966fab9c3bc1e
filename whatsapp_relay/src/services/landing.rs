//! Client of the landing page backend.

use anyhow::{Context, bail};
use async_trait::async_trait;
use std::time::Duration;

use super::{Delivery, LeadSubmission};

#[derive(Clone)]
pub struct RukaLandingClient {
    client: reqwest::Client,
    endpoint: String,
}

impl RukaLandingClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .context("landing http client couldnt be built")?,
            endpoint: format!("{}/api/call-request", base_url.trim_end_matches('/')),
        })
    }

    async fn post_call_request(&self, lead: &LeadSubmission) -> anyhow::Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(lead)
            .send()
            .await
            .context("Failed to send request to the Ruka landing backend")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());

            bail!("Ruka landing backend returned error status {status}: {body}");
        }

        Ok(())
    }
}

#[async_trait]
impl super::LeadSubmitter for RukaLandingClient {
    async fn submit_lead(&self, lead: &LeadSubmission) -> Delivery {
        log::info!(
            "submitting lead {} ({}) to {}",
            lead.name,
            lead.phone_number,
            self.endpoint
        );

        Delivery::from_result(self.post_call_request(lead).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::LeadSubmitter;

    #[test]
    fn test_submission_body_shape() {
        let lead = LeadSubmission {
            name: "Asha".into(),
            phone_number: "+919876543210".into(),
            email: String::new(),
        };

        assert_eq!(
            serde_json::to_value(&lead).unwrap(),
            serde_json::json!({"name": "Asha", "phoneNumber": "+919876543210", "email": ""})
        );
    }

    #[test]
    fn test_endpoint_ignores_trailing_slash() {
        let client = RukaLandingClient::new("https://ruka.live/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.endpoint, "https://ruka.live/api/call-request");
    }

    #[ntex::test]
    async fn test_unreachable_backend_is_a_failed_delivery() {
        let client = RukaLandingClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let lead = LeadSubmission {
            name: "Asha".into(),
            phone_number: "+919876543210".into(),
            email: String::new(),
        };

        assert!(matches!(client.submit_lead(&lead).await, Delivery::Failed(_)));
    }
}
