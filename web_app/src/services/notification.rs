//! Email notifications sent to the Ruka team for every new lead.
//!
//! Messages are rendered from the templates under `templates/notifications`
//! and delivered over SMTP. Without `EMAIL_USER`/`EMAIL_PASS` the handler has
//! no mailer and every notification is reported as not configured.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
};
use serde_json::json;
use std::{sync::LazyLock, time::Duration};
use tera::Tera;

use crate::{config, consts, metric, models, services::Outcome};

static NOTIFICATION_TEMPLATES: LazyLock<Tera> = LazyLock::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        (
            "email_subscription.html",
            include_str!("../../templates/notifications/email_subscription.html"),
        ),
        (
            "call_request.html",
            include_str!("../../templates/notifications/call_request.html"),
        ),
    ])
    .expect("notification templates should be valid tera templates");
    tera
});

fn format_submitted_at(at: DateTime<Utc>) -> String {
    at.format(consts::NOTIFICATION_DATE_FORMAT).to_string()
}

/// Renders the HTML body announcing a new email subscription
pub fn render_email_subscription(email: &str, submitted_at: DateTime<Utc>) -> anyhow::Result<String> {
    let context = tera::Context::from_value(json!({
        "email": email,
        "submitted_at": format_submitted_at(submitted_at),
    }))?;

    NOTIFICATION_TEMPLATES
        .render("email_subscription.html", &context)
        .context("email subscription notification couldnt be rendered")
}

/// Renders the HTML body announcing a new call request
pub fn render_call_request(
    name: &str,
    phone_number: &str,
    email: Option<&str>,
    submitted_at: DateTime<Utc>,
) -> anyhow::Result<String> {
    let context = tera::Context::from_value(json!({
        "name": name,
        "phone_number": phone_number,
        "email": email,
        "submitted_at": format_submitted_at(submitted_at),
    }))?;

    NOTIFICATION_TEMPLATES
        .render("call_request.html", &context)
        .context("call request notification couldnt be rendered")
}

/// SMTP transport plus the fixed sender and recipient
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl Mailer {
    pub fn new(
        host: &str,
        port: u16,
        credentials: &config::SmtpCredentials<'_>,
        recipient: &str,
    ) -> anyhow::Result<Self> {
        // 465 is implicit TLS, every other port negotiates STARTTLS
        let builder = if port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
        };

        let transport = builder
            .port(port)
            .credentials(Credentials::new(
                credentials.user.to_string(),
                credentials.pass.to_string(),
            ))
            .timeout(Some(Duration::from_secs(consts::SMTP_TIMEOUT_SECS)))
            .build();

        Ok(Self {
            transport,
            from: credentials
                .user
                .parse()
                .context("EMAIL_USER is not a valid mailbox")?,
            to: recipient
                .parse()
                .context("NOTIFICATION_EMAIL is not a valid mailbox")?,
        })
    }

    async fn send(&self, subject: &str, html: String) -> anyhow::Result<()> {
        let text = html2text::from_read(html.as_bytes(), 80).unwrap_or_else(|_| html.clone());

        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(text, html))
            .context("notification email couldnt be built")?;

        let response = self
            .transport
            .send(message)
            .await
            .context("smtp relay rejected the notification")?;

        tracing::info!(
            "notification email sent: {}",
            response.message().collect::<Vec<_>>().join(" ")
        );
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct NotificationHandler {
    pub mailer: Option<Mailer>,
}

impl NotificationHandler {
    /// Builds the handler from the app config, a broken mail setup disables notifications
    pub fn from_config(app_config: &config::AppConfig) -> Self {
        let Some(credentials) = app_config.smtp_credentials() else {
            logfire::warn!(
                "Email credentials not configured, set EMAIL_USER and EMAIL_PASS to enable notifications"
            );
            return Self::default();
        };

        match Mailer::new(
            &app_config.smtp_host,
            app_config.smtp_port,
            &credentials,
            &app_config.notification_email,
        ) {
            Ok(mailer) => Self {
                mailer: Some(mailer),
            },
            Err(e) => {
                logfire::warn!(
                    "Email notifications disabled: {error}",
                    error = format!("{e:#}")
                );
                Self::default()
            }
        }
    }

    async fn deliver(&self, subject: &str, html: anyhow::Result<String>) -> Outcome {
        let Some(mailer) = &self.mailer else {
            return Outcome::NotConfigured;
        };

        let outcome = match html {
            Ok(html) => Outcome::from_result(mailer.send(subject, html).await),
            Err(e) => Outcome::Failed(format!("{e:#}")),
        };

        metric::incr_notification_status_statds(outcome.status());
        outcome
    }
}

#[async_trait]
impl crate::services::NotificationService for NotificationHandler {
    async fn notify_email_subscription(
        &self,
        subscription: &models::subscription::EmailSubscription,
    ) -> Outcome {
        self.deliver(
            "New Email Subscription - Ruka",
            render_email_subscription(&subscription.email, subscription.created_at),
        )
        .await
    }

    async fn notify_call_request(
        &self,
        call_request: &models::call_request::CallRequest,
    ) -> Outcome {
        self.deliver(
            &format!("New Call Request - {}", call_request.name),
            render_call_request(
                &call_request.name,
                &call_request.phone_number,
                call_request.email.as_deref(),
                call_request.created_at,
            ),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::NotificationService;
    use chrono::TimeZone;

    fn submitted_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_render_email_subscription_embeds_email_and_date() {
        let html = render_email_subscription("asha@example.com", submitted_at()).unwrap();

        assert!(html.contains("asha@example.com"));
        assert!(html.contains("2024-12-01 09:30:00 UTC"));
    }

    #[test]
    fn test_render_call_request_with_and_without_email() {
        let with_email =
            render_call_request("Asha", "+919876543210", Some("asha@x.com"), submitted_at())
                .unwrap();
        assert!(with_email.contains("Asha"));
        assert!(with_email.contains("+919876543210"));
        assert!(with_email.contains("asha@x.com"));

        let without_email =
            render_call_request("Asha", "+919876543210", None, submitted_at()).unwrap();
        assert!(!without_email.contains("Email:"));
    }

    #[test]
    fn test_render_escapes_submitted_values() {
        let html = render_call_request(
            "<script>alert(1)</script>",
            "+919876543210",
            None,
            submitted_at(),
        )
        .unwrap();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[ntex::test]
    async fn test_notifications_without_mailer_are_not_configured() {
        let handler = NotificationHandler::default();
        let subscription =
            models::subscription::EmailSubscription::create_from_email("asha@example.com");

        assert_eq!(
            handler.notify_email_subscription(&subscription).await,
            Outcome::NotConfigured
        );
    }

    #[ntex::test]
    async fn test_unreachable_smtp_server_fails_without_error() {
        // nothing listens on the discard port
        let mailer = Mailer::new(
            "127.0.0.1",
            9,
            &config::SmtpCredentials {
                user: "bot@ruka.live",
                pass: "secret",
            },
            "hi@ruka.live",
        )
        .unwrap();
        let handler = NotificationHandler {
            mailer: Some(mailer),
        };
        let call_request =
            models::call_request::CallRequest::from(models::call_request::NewCallRequest {
                name: "Asha".to_string(),
                phone_number: "+919876543210".to_string(),
                email: None,
            });

        let outcome = handler.notify_call_request(&call_request).await;

        assert!(matches!(outcome, Outcome::Failed(_)));
    }
}
