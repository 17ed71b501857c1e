//! Request validation helpers shared by the HTTP handlers.
//!
//! Every failure is an `InvalidRequest` error whose details name the JSON
//! field, a machine-readable code and, where useful, the rejected value.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;

use crate::domain::{AssetStatus, Error, UserId};

/// Longest borrower message accepted on create.
pub(crate) const MESSAGE_MAX_CHARS: usize = 500;
/// Longest owner note accepted on decide and complete.
pub(crate) const NOTE_MAX_CHARS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValidationCode {
    InvalidUuid,
    InvalidTimestamp,
    TooLong,
    InvalidStatus,
    InvalidJson,
    InvalidUserId,
    UnsupportedEvent,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::TooLong => "too_long",
            Self::InvalidStatus => "invalid_status",
            Self::InvalidJson => "invalid_json",
            Self::InvalidUserId => "invalid_user_id",
            Self::UnsupportedEvent => "unsupported_event",
        }
    }
}

/// Name of a JSON or path field as clients see it.
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

fn field_error(field: FieldName, code: ValidationCode, message: String) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

fn field_value_error(
    field: FieldName,
    code: ValidationCode,
    message: String,
    value: &str,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
        "value": value,
    }))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        field_value_error(
            field,
            ValidationCode::InvalidUuid,
            format!("{} must be a valid UUID", field.as_str()),
            value,
        )
    })
}

pub(crate) fn parse_rfc3339_timestamp(
    value: &str,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            field_value_error(
                field,
                ValidationCode::InvalidTimestamp,
                format!("{} must be an RFC 3339 timestamp", field.as_str()),
                value,
            )
        })
}

pub(crate) fn parse_optional_rfc3339_timestamp(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .map(|raw| parse_rfc3339_timestamp(raw, field))
        .transpose()
}

/// Reject text longer than `max` characters. Length is counted before
/// sanitisation, so markup counts against the limit.
pub(crate) fn ensure_max_chars(
    value: Option<&str>,
    max: usize,
    field: FieldName,
) -> Result<(), Error> {
    match value {
        Some(text) if text.chars().count() > max => Err(field_error(
            field,
            ValidationCode::TooLong,
            format!("{} must be at most {max} characters", field.as_str()),
        )),
        _ => Ok(()),
    }
}

pub(crate) fn parse_asset_status(value: &str, field: FieldName) -> Result<AssetStatus, Error> {
    value.parse().map_err(|_| {
        field_value_error(
            field,
            ValidationCode::InvalidStatus,
            format!(
                "{} must be one of available, borrowed, in_repair, unlisted",
                field.as_str()
            ),
            value,
        )
    })
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    UserId::new(value).map_err(|err| {
        field_value_error(
            field,
            ValidationCode::InvalidUserId,
            format!("{}: {err}", field.as_str()),
            value,
        )
    })
}

pub(crate) fn unsupported_event(value: &str, field: FieldName) -> Error {
    field_value_error(
        field,
        ValidationCode::UnsupportedEvent,
        format!("{} `{value}` is not a supported event", field.as_str()),
        value,
    )
}

/// Decode a JSON body that clients may omit. An empty or blank body yields
/// `T::default()`; anything else must parse.
pub(crate) fn parse_optional_json_body<T>(body: &[u8]) -> Result<T, Error>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|err| {
        field_error(
            FieldName::new("body"),
            ValidationCode::InvalidJson,
            format!("request body is not valid JSON for this endpoint: {err}"),
        )
    })
}
