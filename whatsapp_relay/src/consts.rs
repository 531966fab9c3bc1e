pub const ACKNOWLEDGMENT_MESSAGE: &str = "Thanks for your enquiry! You will get an automated call to know more about Ruka - Human Like Calling Agent.";

pub const TWILIO_API_URL: &str = "https://api.twilio.com/2010-04-01";
pub const META_GRAPH_API_URL: &str = "https://graph.facebook.com/v17.0";

/// Prefix Twilio puts in front of WhatsApp addresses
pub const WHATSAPP_ADDRESS_PREFIX: &str = "whatsapp:";

pub const UNKNOWN_LEAD_NAME: &str = "Unknown";

/// Webhook body returned to the vendors, whatever happened to the message
pub const WEBHOOK_ACK_BODY: &str = "OK";
