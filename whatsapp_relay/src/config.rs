//! Relay configuration, read once from the environment at start up.
//!
//! Vendor credentials are optional: a channel without them still receives
//! webhooks, it just can't acknowledge the lead back.

use envconfig::Envconfig;
use std::sync::OnceLock;

#[derive(Envconfig, Clone)]
pub struct RelayConfig {
    /// Host address for web server binding (NON-SENSITIVE)
    #[envconfig(from = "WEB_SERVER_HOST", default = "0.0.0.0")]
    pub web_server_host: String,

    #[envconfig(from = "PORT", default = "3001")]
    pub web_server_port: u16,

    /// Landing page backend receiving the call requests (NON-SENSITIVE)
    #[envconfig(from = "RUKA_LANDING_URL", default = "http://localhost:8080")]
    pub ruka_landing_url: String,

    /// Twilio account SID (SEMI-SENSITIVE)
    pub twilio_account_sid: Option<String>,

    /// 🔒 SENSITIVE: Twilio auth token
    pub twilio_auth_token: Option<String>,

    /// Sender of the Twilio replies, e.g. "whatsapp:+14155238886"
    pub twilio_whatsapp_number: Option<String>,

    /// 🔒 SENSITIVE: Meta Graph API access token
    pub whatsapp_access_token: Option<String>,

    /// WhatsApp Business phone number ID (NON-SENSITIVE)
    pub whatsapp_phone_number_id: Option<String>,

    /// 🔒 SENSITIVE: Token echoed by Meta when verifying the webhook
    pub whatsapp_verify_token: Option<String>,

    /// Upper bound, in seconds, for every outbound request
    #[envconfig(default = "10")]
    pub outbound_timeout_secs: u64,
}

pub struct TwilioCredentials<'a> {
    pub account_sid: &'a str,
    pub auth_token: &'a str,
    pub from_number: &'a str,
}

pub struct MetaCredentials<'a> {
    pub access_token: &'a str,
    pub phone_number_id: &'a str,
}

impl RelayConfig {
    pub fn twilio_credentials(&self) -> Option<TwilioCredentials<'_>> {
        match (
            non_blank(&self.twilio_account_sid),
            non_blank(&self.twilio_auth_token),
            non_blank(&self.twilio_whatsapp_number),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => Some(TwilioCredentials {
                account_sid,
                auth_token,
                from_number,
            }),
            _ => None,
        }
    }

    pub fn meta_credentials(&self) -> Option<MetaCredentials<'_>> {
        match (
            non_blank(&self.whatsapp_access_token),
            non_blank(&self.whatsapp_phone_number_id),
        ) {
            (Some(access_token), Some(phone_number_id)) => Some(MetaCredentials {
                access_token,
                phone_number_id,
            }),
            _ => None,
        }
    }

    pub fn verify_token(&self) -> Option<&str> {
        non_blank(&self.whatsapp_verify_token)
    }

    pub fn outbound_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.outbound_timeout_secs)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub static RELAY_CONFIG: OnceLock<RelayConfig> = OnceLock::new();

pub fn init_config() -> anyhow::Result<&'static RelayConfig> {
    let relay_config = RelayConfig::init_from_env()
        .map_err(|e| anyhow::anyhow!("failed to load relay config from env: {e}"))?;

    Ok(RELAY_CONFIG.get_or_init(|| relay_config))
}
