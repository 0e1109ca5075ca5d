use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};
use gerbil_core::{AppError, AppResult};
use gerbil_domain::calendar::parse_optional_date;
use serde::Serialize;
use uuid::Uuid;

mod lenient;

pub use lenient::{optional_f64, optional_i64};

/// `{success, data}` envelope.
#[derive(Debug, Serialize)]
pub struct DataEnvelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// `{success, count, data}` envelope for collections.
#[derive(Debug, Serialize)]
pub struct ListEnvelope<T> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> ListEnvelope<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// `{success, message, data}` envelope for writes that report what they did.
#[derive(Debug, Serialize)]
pub struct MessageEnvelope<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> MessageEnvelope<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// Returns the first value that is present and not blank.
pub(crate) fn first_present(candidates: [Option<String>; 2]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
}

/// Parses an optional enum field, treating blank input as absent.
pub(crate) fn parse_optional<T>(value: Option<String>) -> AppResult<Option<T>>
where
    T: FromStr<Err = AppError>,
{
    value
        .filter(|value| !value.trim().is_empty())
        .map(|value| value.parse::<T>())
        .transpose()
}

/// Parses a required UUID reference carried in a body.
pub(crate) fn parse_uuid_field(field: &str, value: Option<String>) -> AppResult<Uuid> {
    parse_optional_uuid_field(field, value)?
        .ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

/// Parses an optional UUID reference carried in a body.
pub(crate) fn parse_optional_uuid_field(field: &str, value: Option<String>) -> AppResult<Option<Uuid>> {
    let Some(value) = value.filter(|value| !value.trim().is_empty()) else {
        return Ok(None);
    };

    Uuid::parse_str(value.trim())
        .map(Some)
        .map_err(|_| AppError::Validation(format!("{field} must be a UUID, got '{value}'")))
}

/// Parses an RFC 3339 timestamp or a `YYYY-MM-DD` date taken as midnight UTC.
pub(crate) fn parse_optional_timestamp(
    field: &str,
    value: Option<&str>,
) -> AppResult<Option<DateTime<Utc>>> {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(timestamp.with_timezone(&Utc)));
    }

    Ok(parse_optional_date(field, Some(value))?
        .map(|date| date.and_time(NaiveTime::MIN).and_utc()))
}

pub(crate) fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

#[cfg(test)]
mod tests {
    use gerbil_domain::Priority;

    use super::{first_present, parse_optional, parse_optional_timestamp, parse_uuid_field};

    #[test]
    fn first_present_skips_blank_values() {
        let picked = first_present([Some("  ".to_owned()), Some("Apollo".to_owned())]);
        assert_eq!(picked.as_deref(), Some("Apollo"));
        assert_eq!(first_present([None, None]), None);
    }

    #[test]
    fn blank_enum_input_is_absent() {
        let parsed = parse_optional::<Priority>(Some(" ".to_owned())).unwrap_or_default();
        assert_eq!(parsed, None);
        assert!(parse_optional::<Priority>(Some("urgent".to_owned())).is_err());
    }

    #[test]
    fn uuid_fields_name_the_offending_field() {
        let error = parse_uuid_field("project_id", Some("P-1".to_owned()))
            .err()
            .map(|error| error.to_string())
            .unwrap_or_default();
        assert!(error.contains("project_id"));

        let missing = parse_uuid_field("project_id", None)
            .err()
            .map(|error| error.to_string())
            .unwrap_or_default();
        assert!(missing.contains("project_id is required"));
    }

    #[test]
    fn timestamps_accept_dates_and_rfc3339() {
        let from_date = parse_optional_timestamp("executed_at", Some("2026-03-01"))
            .unwrap_or_default()
            .map(|value| value.to_rfc3339());
        assert_eq!(from_date.as_deref(), Some("2026-03-01T00:00:00+00:00"));

        let from_rfc = parse_optional_timestamp("executed_at", Some("2026-03-01T10:30:00+02:00"))
            .unwrap_or_default()
            .map(|value| value.to_rfc3339());
        assert_eq!(from_rfc.as_deref(), Some("2026-03-01T08:30:00+00:00"));

        assert!(parse_optional_timestamp("executed_at", Some("yesterday")).is_err());
    }
}
