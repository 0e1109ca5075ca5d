use chrono::{DateTime, NaiveDate, Utc};
use gerbil_core::{AppError, AppResult};

/// Parses an optional `YYYY-MM-DD` transport value.
///
/// Full RFC 3339 timestamps are accepted and truncated to their UTC date.
/// Blank strings are treated as absent.
pub fn parse_optional_date(field: &str, value: Option<&str>) -> AppResult<Option<NaiveDate>> {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(Some(date));
    }

    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| Some(timestamp.with_timezone(&Utc).date_naive()))
        .map_err(|_| AppError::Validation(format!("{field} must be a date in YYYY-MM-DD format")))
}

/// Normalizes optional free text: trims it, drops blanks and enforces a length cap.
pub fn normalize_optional_text(
    field: &str,
    value: Option<String>,
    max_chars: usize,
) -> AppResult<Option<String>> {
    let Some(trimmed) = value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
    else {
        return Ok(None);
    };

    if trimmed.chars().count() > max_chars {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }

    Ok(Some(trimmed))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{normalize_optional_text, parse_optional_date};

    #[test]
    fn parses_plain_dates_and_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 1);
        assert_eq!(
            parse_optional_date("deadline", Some("2026-03-01")).unwrap_or_default(),
            expected
        );
        assert_eq!(
            parse_optional_date("deadline", Some("2026-03-01T10:00:00Z")).unwrap_or_default(),
            expected
        );
        assert_eq!(
            parse_optional_date("deadline", Some("  ")).unwrap_or_default(),
            None
        );
    }

    #[test]
    fn rejects_malformed_dates() {
        let result = parse_optional_date("start_date", Some("03/01/2026"));
        assert!(result.is_err());
    }

    #[test]
    fn blank_text_is_absent() {
        let value = normalize_optional_text("role", Some("   ".to_owned()), 100);
        assert!(matches!(value, Ok(None)));

        let too_long = normalize_optional_text("role", Some("x".repeat(101)), 100);
        assert!(too_long.is_err());
    }
}
