//! Field format rules applied before anything reaches the store.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ModelError;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z\s]*[A-Za-z][A-Za-z\s]*$").expect("name regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9+_.-]+@(.+)$").expect("email regex"));
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("phone regex"));
static ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("id regex"));

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if !NAME_RE.is_match(name) {
        return Err(ModelError::invalid("Name must contain only letters."));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    if email.trim().is_empty() || !EMAIL_RE.is_match(email) {
        return Err(ModelError::invalid("Please enter a valid email address."));
    }
    Ok(())
}

pub fn validate_phone_number(phone: &str) -> Result<(), ModelError> {
    if !PHONE_RE.is_match(phone) {
        return Err(ModelError::invalid("Phone number must be 10 digits."));
    }
    Ok(())
}

pub fn validate_address(address: &str) -> Result<(), ModelError> {
    require_text(address, "Address cannot be empty.")
}

/// Caller-chosen customer ids must be numeric, matching the counter-minted ones.
pub fn validate_customer_id(id: &str) -> Result<(), ModelError> {
    if !ID_RE.is_match(id) {
        return Err(ModelError::invalid("Invalid ID format. Please enter numbers only."));
    }
    Ok(())
}

/// Legacy purchase entries: non-blank and not a bare number.
pub fn validate_purchase(purchase: &str) -> Result<(), ModelError> {
    let trimmed = purchase.trim();
    if trimmed.is_empty() || ID_RE.is_match(trimmed) {
        return Err(ModelError::invalid("Invalid purchase format. Please enter a valid purchase."));
    }
    Ok(())
}

pub(crate) fn require_text(value: &str, msg: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::invalid(msg));
    }
    Ok(())
}
