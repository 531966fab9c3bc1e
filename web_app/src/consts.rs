pub const SUBSCRIBED_MESSAGE: &str = "Successfully subscribed to updates";
pub const ALREADY_SUBSCRIBED_MESSAGE: &str = "Email already subscribed";
pub const SUBSCRIPTION_FAILED_MESSAGE: &str = "Failed to subscribe. Please try again.";

pub const CALL_REQUEST_RECEIVED_MESSAGE: &str =
    "Call request received! Our AI agent will call you shortly.";
pub const CALL_REQUEST_FAILED_MESSAGE: &str = "Failed to process call request. Please try again.";

pub const RECENT_CALL_REQUESTS_LIMIT: usize = 100;

pub const CRM_LEAD_TOOL_NAME: &str = "zoho_create_lead";
pub const CRM_LEAD_COMPANY: &str = "Via Ruka Website";
pub const CRM_LEAD_SOURCE: &str = "Ruka Website";
/// Last name given to leads whose name is a single word, the CRM requires one
pub const CRM_DEFAULT_LAST_NAME: &str = "Ruka Demo Request";
/// Zoho tokens are cached this long before expiry is assumed
pub const CRM_TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

pub const NOTIFICATION_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";
pub const SMTP_TIMEOUT_SECS: u64 = 10;
