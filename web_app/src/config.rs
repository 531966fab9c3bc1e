//! Application configuration management with security considerations.
//!
//! Every value is read once from the environment at start up. Optional groups
//! (mail transport, Zoho CRM) degrade their feature to a no-op when absent
//! instead of failing the process.
//!
//! # Security Notes
//! - Sensitive fields are clearly marked and should never be logged
//! - Production environments should use secure secret management systems

use envconfig::Envconfig;
use std::sync::OnceLock;

/// Application configuration with security-aware field management.
#[derive(Envconfig, Clone)]
pub struct AppConfig {
    /// Environment name to deploy the app (NON-SENSITIVE)
    /// Values: "local", "dev", "staging", "prod"
    #[envconfig(default = "local")]
    pub env: String,

    /// Host address for web server binding (NON-SENSITIVE)
    #[envconfig(from = "WEB_SERVER_HOST", default = "0.0.0.0")]
    pub web_server_host: String,

    /// Port for web server binding (NON-SENSITIVE)
    #[envconfig(from = "PORT", default = "8080")]
    pub web_server_port: u16,

    /// Comma separated list of origins allowed to post the landing forms (NON-SENSITIVE)
    /// Example: "https://ruka.live,http://localhost:5173"
    #[envconfig(default = "http://localhost:8080,https://ruka.live")]
    pub cors_allowed_origins: String,

    /// 🔒 SENSITIVE: Logfire write token, logs stay local when absent
    pub logfire_token: Option<String>,

    /// Mail account used to authenticate against the SMTP relay (SEMI-SENSITIVE)
    /// Also used as the sender address of every notification.
    pub email_user: Option<String>,

    /// 🔒 SENSITIVE: Mail account password or app password
    pub email_pass: Option<String>,

    /// SMTP relay host (NON-SENSITIVE)
    #[envconfig(default = "smtp.gmail.com")]
    pub smtp_host: String,

    /// SMTP relay port (NON-SENSITIVE)
    /// 465 uses implicit TLS, anything else STARTTLS
    #[envconfig(default = "587")]
    pub smtp_port: u16,

    /// Inbox receiving the lead notifications (NON-SENSITIVE)
    #[envconfig(from = "NOTIFICATION_EMAIL", default = "hi@ruka.live")]
    pub notification_email: String,

    /// Base URL of the MCP server exposing the `zoho_create_lead` tool (NON-SENSITIVE)
    #[envconfig(default = "https://superb-inspiration-production.up.railway.app")]
    pub crm_mcp_url: String,

    /// Upper bound, in seconds, for every CRM request made inside a form submission
    #[envconfig(default = "5")]
    pub crm_timeout_secs: u64,

    /// Zoho OAuth client ID (SEMI-SENSITIVE)
    pub zoho_client_id: Option<String>,

    /// 🔒 SENSITIVE: Zoho OAuth client secret
    pub zoho_client_secret: Option<String>,

    /// 🔒 SENSITIVE: Zoho OAuth refresh token
    /// Rotation: regenerate from the Zoho API console on security incidents
    pub zoho_refresh_token: Option<String>,

    /// Zoho CRM REST base URL (NON-SENSITIVE)
    #[envconfig(default = "https://www.zohoapis.in/crm/v2")]
    pub zoho_api_url: String,

    /// Zoho accounts token endpoint (NON-SENSITIVE)
    #[envconfig(default = "https://accounts.zoho.in/oauth/v2/token")]
    pub zoho_token_url: String,
}

/// Credentials needed to talk to the SMTP relay
pub struct SmtpCredentials<'a> {
    pub user: &'a str,
    pub pass: &'a str,
}

/// Credentials needed for the Zoho refresh token grant
pub struct ZohoCredentials<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub refresh_token: &'a str,
}

impl AppConfig {
    /// Checks if running in production environment
    pub fn is_prod(&self) -> bool {
        self.env.to_lowercase() == "prod"
    }

    /// Returns the mail credentials only when both halves are present and not blank
    pub fn smtp_credentials(&self) -> Option<SmtpCredentials<'_>> {
        match (non_blank(&self.email_user), non_blank(&self.email_pass)) {
            (Some(user), Some(pass)) => Some(SmtpCredentials { user, pass }),
            _ => None,
        }
    }

    /// Returns the Zoho credentials only when the three values are configured
    pub fn zoho_credentials(&self) -> Option<ZohoCredentials<'_>> {
        match (
            non_blank(&self.zoho_client_id),
            non_blank(&self.zoho_client_secret),
            non_blank(&self.zoho_refresh_token),
        ) {
            (Some(client_id), Some(client_secret), Some(refresh_token)) => Some(ZohoCredentials {
                client_id,
                client_secret,
                refresh_token,
            }),
            _ => None,
        }
    }

    /// Origins accepted by the CORS middleware, production only trusts https origins
    pub fn allowed_origins(&self) -> Vec<&str> {
        self.cors_allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .filter(|origin| !self.is_prod() || origin.starts_with("https://"))
            .collect()
    }

    pub fn crm_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.crm_timeout_secs)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Global application configuration instance, set once by [`init_config`]
pub static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Loads the configuration from the environment and stores it in [`APP_CONFIG`]
pub fn init_config() -> anyhow::Result<&'static AppConfig> {
    let app_config = AppConfig::init_from_env()
        .map_err(|e| anyhow::anyhow!("failed to load app config from env: {e}"))?;

    Ok(APP_CONFIG.get_or_init(|| app_config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> AppConfig {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::init_from_hashmap(&env).unwrap()
    }

    #[test]
    fn test_defaults_without_optional_groups() {
        let config = config_from(&[]);

        assert_eq!(config.web_server_port, 8080);
        assert_eq!(config.smtp_port, 587);
        assert_eq!(config.notification_email, "hi@ruka.live");
        assert!(config.smtp_credentials().is_none());
        assert!(config.zoho_credentials().is_none());
        assert!(!config.is_prod());
    }

    #[test]
    fn test_smtp_credentials_need_user_and_pass() {
        let only_user = config_from(&[("EMAIL_USER", "bot@ruka.live")]);
        assert!(only_user.smtp_credentials().is_none());

        let blank_pass = config_from(&[("EMAIL_USER", "bot@ruka.live"), ("EMAIL_PASS", "  ")]);
        assert!(blank_pass.smtp_credentials().is_none());

        let both = config_from(&[("EMAIL_USER", "bot@ruka.live"), ("EMAIL_PASS", "secret")]);
        assert!(both.smtp_credentials().is_some_and(|c| c.user == "bot@ruka.live"));
    }

    #[test]
    fn test_zoho_credentials_need_all_three_values() {
        let partial = config_from(&[("ZOHO_CLIENT_ID", "id"), ("ZOHO_CLIENT_SECRET", "secret")]);
        assert!(partial.zoho_credentials().is_none());

        let full = config_from(&[
            ("ZOHO_CLIENT_ID", "id"),
            ("ZOHO_CLIENT_SECRET", "secret"),
            ("ZOHO_REFRESH_TOKEN", "refresh"),
        ]);
        assert!(full.zoho_credentials().is_some_and(|c| c.refresh_token == "refresh"));
    }

    #[test]
    fn test_allowed_origins_are_trimmed() {
        let config = config_from(&[("CORS_ALLOWED_ORIGINS", " https://ruka.live , ,http://a.b")]);
        assert_eq!(config.allowed_origins(), vec!["https://ruka.live", "http://a.b"]);
    }

    #[test]
    fn test_prod_drops_plain_http_origins() {
        let origins = "https://ruka.live,http://localhost:8080";

        let local = config_from(&[("CORS_ALLOWED_ORIGINS", origins)]);
        assert_eq!(local.allowed_origins().len(), 2);

        let prod = config_from(&[("ENV", "PROD"), ("CORS_ALLOWED_ORIGINS", origins)]);
        assert!(prod.is_prod());
        assert_eq!(prod.allowed_origins(), vec!["https://ruka.live"]);
    }
}
