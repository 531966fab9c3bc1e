//! Landing page forms and their validation.
//!
//! Bodies are first deserialized into loosely typed forms (every field
//! optional) and then validated into trimmed values. Validation collects
//! every violated field instead of stopping at the first one.

use regex::Regex;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{fmt, sync::LazyLock};

use crate::models;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern should compile")
});

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9][0-9]{1,14}$").expect("phone pattern should compile"));

const MIN_PHONE_DIGITS: usize = 10;

pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address";
pub const SHORT_PHONE_MESSAGE: &str = "Phone number must be at least 10 digits";
pub const INVALID_PHONE_MESSAGE: &str =
    "Please enter a valid phone number with country code (e.g., +1234567890)";
pub const MISSING_NAME_MESSAGE: &str = "Please enter your name";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum ValidationErrorKind {
    InvalidEmailFormat,
    InvalidPhoneFormat,
    MissingName,
    MalformedBody,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub field: &'static str,
    pub kind: ValidationErrorKind,
    pub message: String,
}

/// Every violation found in one submission, in field order
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    fn push(&mut self, field: &'static str, kind: ValidationErrorKind, message: &str) {
        self.0.push(FieldError {
            field,
            kind,
            message: message.to_string(),
        });
    }

    pub fn malformed_body(reason: impl fmt::Display) -> Self {
        let mut errors = Self::default();
        errors.push(
            "body",
            ValidationErrorKind::MalformedBody,
            &format!("Invalid request body: {reason}"),
        );
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Message of the first violation, shown to the user
    pub fn first_message(&self) -> &str {
        self.0
            .first()
            .map(|e| e.message.as_str())
            .unwrap_or("Invalid input")
    }

    pub fn kinds(&self) -> Vec<ValidationErrorKind> {
        self.0.iter().map(|e| e.kind).collect()
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            return Ok(value());
        }
        Err(self)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first_message())
    }
}

/// Deserializes a JSON body, any shape problem becomes a `MalformedBody` error
pub fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ValidationErrors> {
    serde_json::from_slice(body).map_err(ValidationErrors::malformed_body)
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_email(errors: &mut ValidationErrors, email: Option<&str>) {
    if !email.is_some_and(|e| EMAIL_PATTERN.is_match(e)) {
        errors.push(
            "email",
            ValidationErrorKind::InvalidEmailFormat,
            INVALID_EMAIL_MESSAGE,
        );
    }
}

fn check_phone(errors: &mut ValidationErrors, phone: Option<&str>) {
    let phone = phone.unwrap_or_default();

    if phone.chars().filter(char::is_ascii_digit).count() < MIN_PHONE_DIGITS {
        errors.push(
            "phoneNumber",
            ValidationErrorKind::InvalidPhoneFormat,
            SHORT_PHONE_MESSAGE,
        );
    }

    if !PHONE_PATTERN.is_match(phone) {
        errors.push(
            "phoneNumber",
            ValidationErrorKind::InvalidPhoneFormat,
            INVALID_PHONE_MESSAGE,
        );
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EmailSubscriptionForm {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, PartialEq)]
pub struct ValidEmailSubscription {
    pub email: String,
}

impl EmailSubscriptionForm {
    pub fn validate(self) -> Result<ValidEmailSubscription, ValidationErrors> {
        let email = trimmed(self.email);

        let mut errors = ValidationErrors::default();
        check_email(&mut errors, email.as_deref());

        errors.into_result(|| ValidEmailSubscription {
            email: email.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequestForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    /// optional, blank means no email
    #[serde(default)]
    pub email: Option<String>,
}

impl CallRequestForm {
    pub fn validate(self) -> Result<models::call_request::NewCallRequest, ValidationErrors> {
        let name = trimmed(self.name);
        let phone_number = trimmed(self.phone_number);
        let email = trimmed(self.email);

        let mut errors = ValidationErrors::default();
        if name.is_none() {
            errors.push("name", ValidationErrorKind::MissingName, MISSING_NAME_MESSAGE);
        }
        check_phone(&mut errors, phone_number.as_deref());
        if email.is_some() {
            check_email(&mut errors, email.as_deref());
        }

        errors.into_result(|| models::call_request::NewCallRequest {
            name: name.unwrap_or_default(),
            phone_number: phone_number.unwrap_or_default(),
            email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call_request_form(name: &str, phone: &str, email: Option<&str>) -> CallRequestForm {
        CallRequestForm {
            name: Some(name.to_string()),
            phone_number: Some(phone.to_string()),
            email: email.map(str::to_string),
        }
    }

    #[test]
    fn test_email_subscription_valid_and_trimmed() {
        let form = EmailSubscriptionForm {
            email: Some("  asha@example.com ".into()),
        };
        assert_eq!(
            form.validate(),
            Ok(ValidEmailSubscription {
                email: "asha@example.com".into()
            })
        );
    }

    #[test]
    fn test_email_subscription_invalid_formats() {
        for email in [None, Some(""), Some("asha"), Some("asha@example"), Some("a b@x.com")] {
            let form = EmailSubscriptionForm {
                email: email.map(str::to_string),
            };
            let errors = form.validate().unwrap_err();
            assert_eq!(errors.kinds(), vec![ValidationErrorKind::InvalidEmailFormat]);
            assert_eq!(errors.first_message(), INVALID_EMAIL_MESSAGE);
        }
    }

    #[test]
    fn test_call_request_valid_without_email() {
        let new_request = call_request_form(" Asha ", "+919876543210", Some("  "))
            .validate()
            .unwrap();

        assert_eq!(new_request.name, "Asha");
        assert_eq!(new_request.phone_number, "+919876543210");
        assert_eq!(new_request.email, None);
    }

    #[test]
    fn test_call_request_valid_with_email() {
        let new_request = call_request_form("Asha", "919876543210", Some("asha@x.com"))
            .validate()
            .unwrap();
        assert_eq!(new_request.email.as_deref(), Some("asha@x.com"));
    }

    #[test]
    fn test_call_request_rejects_bad_phone_numbers() {
        for phone in ["12345", "+0123456789", "+1 415 555 0100", "phone-number", "+1234567890123456"] {
            let errors = call_request_form("Asha", phone, None).validate().unwrap_err();
            assert!(
                errors
                    .kinds()
                    .iter()
                    .all(|k| *k == ValidationErrorKind::InvalidPhoneFormat),
                "{phone} should only fail on the phone number"
            );
        }
    }

    #[test]
    fn test_call_request_rejects_non_ascii_digits() {
        // ten ASCII digits followed by Arabic-Indic ones
        let errors = call_request_form("Asha", "+9198765432\u{0661}\u{0662}\u{0663}", None)
            .validate()
            .unwrap_err();
        assert_eq!(errors.kinds(), vec![ValidationErrorKind::InvalidPhoneFormat]);
        assert_eq!(errors.first_message(), INVALID_PHONE_MESSAGE);

        let errors = call_request_form("Asha", "+\u{FF11}\u{FF14}\u{FF11}\u{FF15}5550100", None)
            .validate()
            .unwrap_err();
        assert!(
            errors
                .kinds()
                .iter()
                .all(|k| *k == ValidationErrorKind::InvalidPhoneFormat)
        );
    }

    #[test]
    fn test_call_request_short_phone_reports_both_messages() {
        let errors = call_request_form("Asha", "12345", None).validate().unwrap_err();
        assert_eq!(errors.errors().len(), 1);
        assert_eq!(errors.first_message(), SHORT_PHONE_MESSAGE);

        let errors = call_request_form("Asha", "abc", None).validate().unwrap_err();
        assert_eq!(errors.errors().len(), 2);
    }

    #[test]
    fn test_call_request_collects_every_violation() {
        let errors = call_request_form("   ", "12", Some("nope"))
            .validate()
            .unwrap_err();

        assert_eq!(
            errors.kinds(),
            vec![
                ValidationErrorKind::MissingName,
                ValidationErrorKind::InvalidPhoneFormat,
                ValidationErrorKind::InvalidEmailFormat,
            ]
        );
        assert_eq!(errors.first_message(), MISSING_NAME_MESSAGE);
    }

    #[test]
    fn test_parse_body_malformed() {
        let errors = parse_body::<CallRequestForm>(b"name=asha").unwrap_err();
        assert_eq!(errors.kinds(), vec![ValidationErrorKind::MalformedBody]);

        let errors = parse_body::<CallRequestForm>(br#"{"name": 42}"#).unwrap_err();
        assert_eq!(errors.kinds(), vec![ValidationErrorKind::MalformedBody]);
    }

    #[test]
    fn test_parse_body_missing_fields_are_none() {
        let form = parse_body::<CallRequestForm>(b"{}").unwrap();
        assert!(form.name.is_none() && form.phone_number.is_none() && form.email.is_none());
    }

    #[test]
    fn test_validation_errors_serialize_as_list() {
        let errors = EmailSubscriptionForm::default().validate().unwrap_err();
        let value = serde_json::to_value(&errors).unwrap();

        assert_eq!(value[0]["field"], "email");
        assert_eq!(value[0]["kind"], "InvalidEmailFormat");
    }
}
