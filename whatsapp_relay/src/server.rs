//! Relay web server: shared state, health check and start up.

use chrono::Utc;
use ntex::web;
use serde_json::json;

use crate::{config, services, webhook};

pub struct RelayState {
    pub submitter: services::ImplLeadSubmitter,
    /// `None` when the Twilio credentials are missing
    pub twilio: Option<services::ImplReplySender>,
    /// `None` when the Meta credentials are missing
    pub meta: Option<services::ImplReplySender>,
    pub verify_token: Option<String>,
    pub landing_url: String,
}

#[web::get("/health")]
pub async fn health(state: web::types::State<RelayState>) -> impl web::Responder {
    web::HttpResponse::Ok().json(&json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "rukaUrl": state.landing_url,
    }))
}

/// Clients built once at start up and cloned into every worker
#[derive(Clone)]
struct RelayClients {
    landing: services::landing::RukaLandingClient,
    twilio: Option<services::whatsapp::TwilioClient>,
    meta: Option<services::whatsapp::MetaClient>,
}

impl RelayClients {
    fn from_config(relay_config: &config::RelayConfig) -> anyhow::Result<Self> {
        let timeout = relay_config.outbound_timeout();

        let twilio = match relay_config.twilio_credentials() {
            Some(credentials) => {
                log::info!("Twilio client initialized for WhatsApp replies");
                Some(services::whatsapp::TwilioClient::new(&credentials, timeout)?)
            }
            None => {
                log::warn!("Twilio credentials not found, Twilio leads won't be acknowledged");
                None
            }
        };

        let meta = match relay_config.meta_credentials() {
            Some(credentials) => Some(services::whatsapp::MetaClient::new(&credentials, timeout)?),
            None => {
                log::warn!("Meta WhatsApp API not configured, Meta leads won't be acknowledged");
                None
            }
        };

        if relay_config.verify_token().is_none() {
            log::warn!("WHATSAPP_VERIFY_TOKEN not set, Meta webhook verification will fail");
        }

        Ok(Self {
            landing: services::landing::RukaLandingClient::new(
                &relay_config.ruka_landing_url,
                timeout,
            )?,
            twilio,
            meta,
        })
    }

    fn into_state(self, relay_config: &config::RelayConfig) -> RelayState {
        RelayState {
            submitter: Box::new(self.landing),
            twilio: self
                .twilio
                .map(|client| Box::new(client) as services::ImplReplySender),
            meta: self
                .meta
                .map(|client| Box::new(client) as services::ImplReplySender),
            verify_token: relay_config.verify_token().map(str::to_string),
            landing_url: relay_config.ruka_landing_url.clone(),
        }
    }
}

pub async fn run_server(relay_config: &'static config::RelayConfig) -> anyhow::Result<()> {
    let clients = RelayClients::from_config(relay_config)?;
    let server_addr = (
        relay_config.web_server_host.as_str(),
        relay_config.web_server_port,
    );

    log::info!(
        "WhatsApp relay running on port {}, forwarding leads to {}",
        relay_config.web_server_port,
        relay_config.ruka_landing_url
    );
    log::info!("  Twilio webhook: /webhook/whatsapp/twilio");
    log::info!("  Meta webhook: /webhook/whatsapp/meta");

    web::server(move || {
        web::App::new()
            .wrap(web::middleware::Logger::default())
            .state(clients.clone().into_state(relay_config))
            .configure(webhook::routes::whatsapp)
            .service(health)
    })
    .bind(server_addr)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
