//! Route configuration for the landing page backend.

use super::lead;
use ntex::web;

/// Configures the form endpoints used by the landing page.
///
/// # Routes
/// - `POST /api/email-subscription` - Subscribe an email to product updates
/// - `POST /api/call-request` - Request a call back from the AI agent
pub fn api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api").service((lead::create_email_subscription, lead::create_call_request)),
    );
}
