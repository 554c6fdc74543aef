//! Validation utilities for the Farm Weather Advisory platform
//!
//! Includes Kenya-specific checks for farmer contact details.

use rust_decimal::Decimal;

/// Number of log entries returned when no limit is given
pub const DEFAULT_HISTORY_LIMIT: i64 = 7;

/// Largest history page a caller may request
pub const MAX_HISTORY_LIMIT: i64 = 100;

// ============================================================================
// Account Validations
// ============================================================================

/// Validate a mandatory text field is present
pub fn validate_required(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("This field is required");
    }
    Ok(())
}

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format");
    };
    if local.is_empty() || domain.contains('@') || email.contains(char::is_whitespace) {
        return Err("Invalid email format");
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && tld.len() >= 2 => Ok(()),
        _ => Err("Invalid email format"),
    }
}

/// Validate password length
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 6 {
        return Err("Password must be at least 6 characters");
    }
    Ok(())
}

/// Validate Kenyan phone number format
/// Accepts: 0712345678, 0112 345 678, +254712345678
pub fn validate_kenyan_phone(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    // Local format: 10 digits, 07xx or 01xx
    if digits.len() == 10 && (digits.starts_with("07") || digits.starts_with("01")) {
        return Ok(());
    }
    // International format with country code
    if digits.len() == 12 && (digits.starts_with("2547") || digits.starts_with("2541")) {
        return Ok(());
    }

    Err("Invalid Kenyan phone number format")
}

// ============================================================================
// Farm Profile Validations
// ============================================================================

/// Validate latitude is within -90..=90
pub fn validate_latitude(latitude: Decimal) -> Result<(), &'static str> {
    if latitude < Decimal::from(-90) || latitude > Decimal::from(90) {
        return Err("Latitude must be between -90 and 90");
    }
    Ok(())
}

/// Validate longitude is within -180..=180
pub fn validate_longitude(longitude: Decimal) -> Result<(), &'static str> {
    if longitude < Decimal::from(-180) || longitude > Decimal::from(180) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

/// Validate farm size in acres
pub fn validate_farm_size(size: Decimal) -> Result<(), &'static str> {
    if size <= Decimal::ZERO {
        return Err("Farm size must be greater than zero");
    }
    Ok(())
}

/// Resolve a requested history limit into the supported range
pub fn clamp_history_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT)
}
