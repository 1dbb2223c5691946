//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request DTOs carry identifiers, dates and enum values as text; these
//! helpers parse them and report failures as `invalid_request` errors whose
//! details name the offending field.

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDate;
use serde_json::json;

use crate::domain::{Error, InvalidId, UnknownValue};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidDate,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidDate => "invalid_date",
            Self::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value,
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    ValidationError::new(field, format!("missing required field: {}", field.as_str()))
        .with_code(ErrorCode::MissingField)
}

/// Report a domain validation failure against `field`.
pub(crate) fn invalid_field(field: FieldName, reason: impl Display) -> Error {
    ValidationError::new(field, reason.to_string()).with_code(ErrorCode::InvalidValue)
}

pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn parse_id<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr<Err = InvalidId>,
{
    value.parse().map_err(|_| {
        ValidationError::new(field, format!("{} must be a valid UUID", field.as_str()))
            .with_value(ErrorCode::InvalidUuid, value)
    })
}

pub(crate) fn parse_optional_id<T>(value: Option<&str>, field: FieldName) -> Result<Option<T>, Error>
where
    T: FromStr<Err = InvalidId>,
{
    value.map(|raw| parse_id(raw, field)).transpose()
}

pub(crate) fn parse_enum<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr<Err = UnknownValue>,
{
    value
        .parse()
        .map_err(|err: UnknownValue| {
            ValidationError::new(field, err.to_string()).with_value(ErrorCode::InvalidValue, value)
        })
}

pub(crate) fn parse_optional_enum<T>(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<T>, Error>
where
    T: FromStr<Err = UnknownValue>,
{
    value.map(|raw| parse_enum(raw, field)).transpose()
}

pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        ValidationError::new(field, format!("{} must be a YYYY-MM-DD date", field.as_str()))
            .with_value(ErrorCode::InvalidDate, value)
    })
}

pub(crate) fn parse_optional_date(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<NaiveDate>, Error> {
    value.map(|raw| parse_date(raw, field)).transpose()
}
