//! # WhatsApp Message Relay
//!
//! Decides what happens to one inbound message: ad-sourced messages become
//! call requests on the landing backend and get acknowledged, anything else
//! is dropped.

use super::schemas::InboundMessage;
use crate::{
    ad_tracker, consts, lead,
    services::{Delivery, ImplLeadSubmitter, ImplReplySender, LeadSubmission},
};

#[derive(Debug, PartialEq)]
pub enum RelayOutcome {
    /// Not from an Instagram ad
    Ignored,
    Forwarded { acknowledgment: Delivery },
    ForwardFailed(String),
}

/// Relays one message to the landing backend.
///
/// # Arguments
/// * `message` - Normalized inbound message
/// * `submitter` - Client of the call request endpoint
/// * `reply_sender` - Client of the channel the message came from, `None` when not configured
pub async fn relay_inbound_message(
    message: &InboundMessage,
    submitter: &ImplLeadSubmitter,
    reply_sender: Option<&ImplReplySender>,
) -> RelayOutcome {
    log::info!(
        "Received WhatsApp message via {:?} from {}",
        message.channel,
        message.sender
    );

    if !ad_tracker::is_from_instagram_ad(&message.text) {
        log::info!(
            "Message from {} not from an Instagram ad, ignoring",
            message.sender
        );
        return RelayOutcome::Ignored;
    }

    let campaign = ad_tracker::campaign_details(&message.text);
    log::info!(
        "Instagram ad lead detected, campaign {} ad set {:?}",
        campaign.campaign,
        campaign.ad_set
    );

    let parsed = lead::parse_lead_message(&message.text, message.profile_name.as_deref());
    log::info!(
        "Lead parsed: name {}, interests {:?}",
        parsed.name,
        parsed.interests
    );

    let submission = LeadSubmission {
        name: parsed.name,
        phone_number: message.phone_number.clone(),
        email: parsed.email.unwrap_or_default(),
    };

    let forwarded = submitter.submit_lead(&submission).await;
    if !forwarded.is_done() {
        let reason = match forwarded {
            Delivery::Failed(reason) => reason,
            _ => "landing backend not configured".to_string(),
        };
        log::error!("Failed to submit lead from {}: {reason}", message.sender);
        return RelayOutcome::ForwardFailed(reason);
    }

    let acknowledgment = match reply_sender {
        Some(sender) => {
            sender
                .send_reply(&message.sender, consts::ACKNOWLEDGMENT_MESSAGE)
                .await
        }
        None => Delivery::NotConfigured,
    };

    match &acknowledgment {
        Delivery::Done => log::info!("WhatsApp reply sent to Instagram lead {}", message.sender),
        Delivery::NotConfigured => log::warn!(
            "{:?} replies not configured, lead {} not acknowledged",
            message.channel,
            message.sender
        ),
        Delivery::Failed(reason) => {
            log::error!("Failed to acknowledge lead {}: {reason}", message.sender)
        }
    }

    RelayOutcome::Forwarded { acknowledgment }
}
