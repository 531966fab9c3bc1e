//! Instagram ad detection.
//!
//! A keyword heuristic over the message text: the ads' call-to-action
//! pre-fills one of these codes or phrases. It only routes leads, anyone
//! typing an indicator gets through.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Lowercase fragments that mark a message as sent from an Instagram ad
pub const INSTAGRAM_INDICATORS: &[&str] = &[
    // ad codes
    "ig_ad",
    "instagram_ad",
    "insta_ad",
    "ig_promo",
    "ig2024",
    "igruka",
    // call-to-action phrases
    "from instagram",
    "saw your instagram",
    "instagram post",
    "instagram ad",
    "ig ad",
    "your ig",
    // campaign codes
    "igdec24",
    "igoffer",
    "igspecial",
    "instaoffer",
    // utm parameters
    "utm_source=instagram",
    "utm_source=ig",
    "utm_medium=social",
    "utm_campaign=ig",
    // canned replies
    "interested from instagram",
    "dm from instagram",
    "message from ig",
];

/// Known campaign codes and the campaign they stand for, first match wins
const CAMPAIGN_CODES: &[(&str, &str)] = &[
    ("igdec24", "December 2024 Campaign"),
    ("igoffer", "Special Offer Campaign"),
    ("ig_promo", "Promotional Campaign"),
];

static CAMPAIGN_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)campaign[_=]([a-zA-Z0-9_-]+)").expect("campaign pattern should compile")
});

static AD_SET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)adset[_=]([a-zA-Z0-9_-]+)").expect("ad set pattern should compile")
});

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdCampaign {
    pub platform: &'static str,
    pub campaign: String,
    pub ad_set: Option<String>,
}

pub fn is_from_instagram_ad(message: &str) -> bool {
    let message = message.to_lowercase();

    INSTAGRAM_INDICATORS
        .iter()
        .any(|indicator| message.contains(indicator))
}

/// Campaign the message belongs to, an explicit `campaign=<id>` wins over known codes
pub fn campaign_details(message: &str) -> AdCampaign {
    let lowercase = message.to_lowercase();

    let known_campaign = CAMPAIGN_CODES
        .iter()
        .find(|(code, _)| lowercase.contains(code))
        .map(|(_, campaign)| campaign.to_string());

    let campaign_id = CAMPAIGN_ID_PATTERN
        .captures(message)
        .map(|caps| caps[1].to_string());

    AdCampaign {
        platform: "Instagram",
        campaign: campaign_id
            .or(known_campaign)
            .unwrap_or_else(|| "Unknown".to_string()),
        ad_set: AD_SET_PATTERN
            .captures(message)
            .map(|caps| caps[1].to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_from_instagram_ad() {
        assert!(is_from_instagram_ad(
            "Hi, saw your instagram ad, interested in pricing!"
        ));
        assert!(is_from_instagram_ad("IGOFFER"));
        assert!(is_from_instagram_ad("https://ruka.live/?utm_source=ig&x=1"));

        assert!(!is_from_instagram_ad("Hi, what are your hours?"));
        assert!(!is_from_instagram_ad(""));
    }

    #[test]
    fn test_campaign_details_known_codes() {
        assert_eq!(
            campaign_details("igdec24 call me"),
            AdCampaign {
                platform: "Instagram",
                campaign: "December 2024 Campaign".into(),
                ad_set: None,
            }
        );
        assert_eq!(
            campaign_details("saw your instagram ad").campaign,
            "Unknown"
        );
    }

    #[test]
    fn test_campaign_details_explicit_ids() {
        let details = campaign_details("igoffer campaign=spring-25 AdSet_b2");

        assert_eq!(details.campaign, "spring-25");
        assert_eq!(details.ad_set.as_deref(), Some("b2"));
    }
}
