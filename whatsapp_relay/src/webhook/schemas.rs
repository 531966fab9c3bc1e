//! # WhatsApp Webhook Schemas
//!
//! Inbound payloads of both vendors and the channel-neutral message they are
//! normalized into. Every field is optional on the wire so a partial payload
//! still yields whatever text messages it carries.

use serde::Deserialize;

use crate::consts;

/// Vendor a message arrived through, replies go back the same way
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Twilio,
    Meta,
}

/// A text message normalized from either vendor's webhook
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub channel: Channel,
    /// Address replies are sent to, vendor specific
    pub sender: String,
    pub phone_number: String,
    pub text: String,
    pub profile_name: Option<String>,
}

/// Form fields Twilio posts for an incoming WhatsApp message
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TwilioInbound {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub profile_name: Option<String>,
}

impl TwilioInbound {
    /// `None` when the form names no sender
    pub fn into_message(self) -> Option<InboundMessage> {
        let sender = self.from.trim().to_string();
        if sender.is_empty() {
            return None;
        }

        Some(InboundMessage {
            channel: Channel::Twilio,
            phone_number: sender.replacen(consts::WHATSAPP_ADDRESS_PREFIX, "", 1),
            sender,
            text: self.body,
            profile_name: self.profile_name,
        })
    }
}

/// Root webhook payload from the Meta Cloud API
#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct Value {
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub profile: Profile,
    /// WhatsApp ID (phone number)
    #[serde(default)]
    pub wa_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub from: String,
    /// Message type (text, image, audio...)
    #[serde(rename = "type", default)]
    pub msg_type: String,
    #[serde(default)]
    pub text: Option<TextMessage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TextMessage {
    #[serde(default)]
    pub body: String,
}

impl Value {
    /// Sender name: the contact with the sender's `wa_id`, else the first contact
    fn profile_name_for(&self, sender: &str) -> Option<String> {
        self.contacts
            .iter()
            .find(|c| c.wa_id == sender)
            .or_else(|| self.contacts.first())
            .map(|c| c.profile.name.trim().to_string())
            .filter(|name| !name.is_empty())
    }
}

impl WebhookPayload {
    /// Every text message in the payload, status updates and media are skipped
    pub fn into_messages(self) -> Vec<InboundMessage> {
        self.entry
            .iter()
            .flat_map(|entry| &entry.changes)
            .flat_map(|change| {
                change.value.messages.iter().filter_map(move |message| {
                    let text = message.text.as_ref()?;
                    if message.from.is_empty() {
                        return None;
                    }

                    Some(InboundMessage {
                        channel: Channel::Meta,
                        sender: message.from.clone(),
                        phone_number: message.from.clone(),
                        text: text.body.clone(),
                        profile_name: change.value.profile_name_for(&message.from),
                    })
                })
            })
            .collect()
    }
}
