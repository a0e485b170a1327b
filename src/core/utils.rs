//! Small input helpers shared by the handlers

use crate::core::error::{CareError, Result};
use chrono::{NaiveDate, NaiveTime};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Trim and lower-case an email address, rejecting obviously malformed ones
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(CareError::ValidationError(format!(
            "'{}' is not a valid email address",
            email
        ))),
    }
}

/// Reject empty or whitespace-only values
pub fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CareError::ValidationError(format!("{} cannot be empty", field)));
    }
    Ok(())
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        CareError::ValidationError(format!("{} must be a date in YYYY-MM-DD format", field))
    })
}

/// Parse an `HH:MM` time of day
pub fn parse_time(field: &str, value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, TIME_FORMAT).map_err(|_| {
        CareError::ValidationError(format!("{} must be a time in HH:MM format", field))
    })
}

/// Round a rating or percentage to one decimal place
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Current UTC time as stored in `created_at` columns
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Doc@Example.COM ").unwrap(), "doc@example.com");
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("doc@").is_err());
    }

    #[test]
    fn test_parse_date_and_time() {
        assert!(parse_date("date", "2026-03-01").is_ok());
        assert!(parse_date("date", "01/03/2026").is_err());
        assert!(parse_time("time", "08:30").is_ok());
        assert!(parse_time("time", "8.30am").is_err());
    }

    #[test]
    fn test_round_one_decimal() {
        assert_eq!(round_one_decimal(4.25), 4.3);
        assert_eq!(round_one_decimal(3.0), 3.0);
        assert_eq!(round_one_decimal(4.666), 4.7);
    }

    #[test]
    fn test_require_non_blank() {
        assert!(require_non_blank("dosage", "10mg").is_ok());
        assert!(require_non_blank("dosage", "   ").is_err());
    }
}
