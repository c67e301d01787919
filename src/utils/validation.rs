use std::borrow::Cow;

use chrono::NaiveDate;
use validator::{ValidateEmail, ValidationError, ValidationErrors};

use crate::errors::AppError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Custom validator: rejects empty and whitespace-only strings.
pub fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::from("must not be blank")));
    }
    Ok(())
}

/// Custom validator: an email address, ignoring surrounding whitespace.
pub fn email_address(value: &str) -> Result<(), ValidationError> {
    if !value.trim().validate_email() {
        return Err(ValidationError::new("email").with_message(Cow::from("must be a valid email address")));
    }
    Ok(())
}

/// Custom validator: accepts `YYYY-MM-DD` calendar dates only.
pub fn calendar_date(value: &str) -> Result<(), ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| {
            ValidationError::new("date")
                .with_message(Cow::from("must be a valid calendar date (YYYY-MM-DD)"))
        })
}

/// Parse a date field that has already passed [`calendar_date`].
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        let mut errors = ValidationErrors::new();
        errors.add(
            field,
            ValidationError::new("date")
                .with_message(Cow::from("must be a valid calendar date (YYYY-MM-DD)")),
        );
        AppError::Validation(errors)
    })
}

/// Trim a required string.
pub fn clean(value: &str) -> String {
    value.trim().to_string()
}

/// Trim an optional string, folding blanks into `None`.
pub fn clean_opt(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
