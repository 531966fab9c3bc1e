//! Lead extraction from free-form WhatsApp text.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::consts;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._-]+@[a-zA-Z0-9._-]+\.[a-zA-Z0-9_-]+")
        .expect("email pattern should compile")
});

/// "my name is Asha", "I'm Ravi Kumar": the introduced name must be capitalized
static INTRODUCED_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?i:my name is|i am|i'm|this is)\s+([A-Z][a-zA-Z]*(?:[ \t]+[A-Z][a-zA-Z]*)*)")
        .expect("introduced name pattern should compile")
});

static LEADING_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)*)").expect("leading name pattern should compile")
});

/// Openers that look like a leading capitalized name but aren't one
const GREETINGS: &[&str] = &[
    "hi", "hello", "hey", "hiya", "hola", "namaste", "greetings", "good", "dear", "thanks",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Interest {
    Pricing,
    Demo,
    Support,
    Purchase,
    Information,
}

static INTEREST_PATTERNS: LazyLock<Vec<(Interest, Regex)>> = LazyLock::new(|| {
    [
        (Interest::Pricing, r"(?i)pric(e|ing)|cost|fee|charge|payment"),
        (Interest::Demo, r"(?i)demo|trial|try|test"),
        (Interest::Support, r"(?i)help|support|issue|problem"),
        (Interest::Purchase, r"(?i)buy|purchase|order|interested"),
        (Interest::Information, r"(?i)info|details|know more"),
    ]
    .into_iter()
    .map(|(interest, pattern)| {
        (
            interest,
            Regex::new(pattern).expect("interest pattern should compile"),
        )
    })
    .collect()
});

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedLead {
    pub name: String,
    pub email: Option<String>,
    /// At most one entry per category, in declaration order
    pub interests: Vec<Interest>,
    pub raw_message: String,
    pub timestamp: DateTime<Utc>,
}

fn introduced_name(message: &str) -> Option<String> {
    INTRODUCED_NAME_PATTERN
        .captures(message)
        .map(|caps| caps[1].trim().to_string())
}

fn leading_name(message: &str) -> Option<String> {
    let captured = LEADING_NAME_PATTERN.captures(message.trim_start())?;

    // "Hi Asha here": the greeting goes, the words after it are the name
    let name = captured[1]
        .split_whitespace()
        .skip_while(|word| GREETINGS.contains(&word.to_lowercase().as_str()))
        .collect::<Vec<_>>()
        .join(" ");

    (!name.is_empty()).then_some(name)
}

/// Extracts the lead fields found in a message.
///
/// The name comes from an introduction phrase, then from leading capitalized
/// words, then from the sender profile and finally falls back to "Unknown".
pub fn parse_lead_message(message: &str, profile_name: Option<&str>) -> ParsedLead {
    let name = introduced_name(message)
        .or_else(|| leading_name(message))
        .or_else(|| {
            profile_name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| consts::UNKNOWN_LEAD_NAME.to_string());

    ParsedLead {
        name,
        email: EMAIL_PATTERN
            .find(message)
            .map(|m| m.as_str().to_string()),
        interests: INTEREST_PATTERNS
            .iter()
            .filter(|(_, pattern)| pattern.is_match(message))
            .map(|(interest, _)| *interest)
            .collect(),
        raw_message: message.to_string(),
        timestamp: Utc::now(),
    }
}
