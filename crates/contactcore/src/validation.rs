//! Contact input validation and phone normalization.

use phonenumber::Mode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lifecycle::non_empty_trimmed;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("Name is required")]
    EmptyName,
    #[error("Phone number is required")]
    MissingPhone,
    #[error("Please enter a valid phone number with country code")]
    InvalidPhone,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::EmptyName => "EMPTY_NAME",
            ValidationError::MissingPhone => "MISSING_PHONE",
            ValidationError::InvalidPhone => "INVALID_PHONE",
        }
    }
}

/// Raw contact details as a submitter typed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInput {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

/// A contact that passed validation, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidContact {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub company: Option<String>,
}

/// Parses an international number and returns its E.164 form.
///
/// Returns `None` unless the value carries a country code and is a valid
/// number for that country's numbering plan. Every way of writing the same
/// number (spacing, punctuation, a bracketed trunk prefix) yields the same
/// string.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if !raw.starts_with('+') {
        return None;
    }
    let number = phonenumber::parse(None, raw).ok()?;
    if !phonenumber::is_valid(&number) {
        return None;
    }
    Some(number.format().mode(Mode::E164).to_string())
}

/// Validates a submission and produces the record to store.
///
/// The stored name is `prefix + trimmed name` when a non-empty prefix is
/// configured. Optional fields are trimmed and empty values become `None`.
pub fn validate(input: &ContactInput, prefix: Option<&str>) -> Result<ValidContact, ValidationError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }

    let raw_phone = match input.phone.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => p,
        _ => return Err(ValidationError::MissingPhone),
    };
    let phone = normalize_phone(raw_phone).ok_or(ValidationError::InvalidPhone)?;

    let name = match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{}{}", prefix, name),
        _ => name.to_string(),
    };

    Ok(ValidContact {
        name,
        phone,
        email: non_empty_trimmed(input.email.clone()),
        company: non_empty_trimmed(input.company.clone()),
    })
}
