//! Field-level validation shared by entity constructors.

use serde_json::json;

use super::Error;

/// A single invalid field in a command.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    /// Required value was missing or blank once trimmed.
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    /// Value is shorter than allowed.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },
    /// Value is longer than allowed.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    /// Value does not match the expected shape.
    #[error("{field} {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },
    /// Numeric value outside its accepted range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
}

impl FieldError {
    /// Name of the offending request field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field }
            | Self::TooShort { field, .. }
            | Self::TooLong { field, .. }
            | Self::InvalidFormat { field, .. }
            | Self::OutOfRange { field, .. } => field,
        }
    }

    /// Stable machine-readable validation code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Empty { .. } => "missing_field",
            Self::TooShort { .. } => "too_short",
            Self::TooLong { .. } => "too_long",
            Self::InvalidFormat { .. } => "invalid_format",
            Self::OutOfRange { .. } => "out_of_range",
        }
    }
}

impl From<FieldError> for Error {
    fn from(value: FieldError) -> Self {
        Error::invalid_request(value.to_string()).with_details(json!({
            "field": value.field(),
            "code": value.code(),
        }))
    }
}

/// Trim a required text value and enforce its maximum length.
pub fn required_text(field: &'static str, value: &str, max: usize) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Empty { field });
    }
    bounded(field, trimmed, max)
}

/// Trim an optional text value; blank input collapses to `None`.
pub fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, FieldError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) => bounded(field, trimmed, max).map(Some),
    }
}

fn bounded(field: &'static str, value: &str, max: usize) -> Result<String, FieldError> {
    if value.chars().count() > max {
        return Err(FieldError::TooLong { field, max });
    }
    Ok(value.to_owned())
}

/// Reject NaN and infinities in optional sensor readings.
pub fn finite(field: &'static str, value: Option<f64>) -> Result<Option<f64>, FieldError> {
    match value {
        Some(v) if !v.is_finite() => Err(FieldError::InvalidFormat {
            field,
            reason: "must be a finite number",
        }),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("  Lyon  ", Ok("Lyon".to_owned()))]
    #[case("   ", Err(FieldError::Empty { field: "name" }))]
    #[case("abcdef", Err(FieldError::TooLong { field: "name", max: 5 }))]
    fn required_text_trims_and_bounds(
        #[case] input: &str,
        #[case] expected: Result<String, FieldError>,
    ) {
        assert_eq!(required_text("name", input, 5), expected);
    }

    #[rstest]
    #[case(None, Ok(None))]
    #[case(Some("  "), Ok(None))]
    #[case(Some(" hi "), Ok(Some("hi".to_owned())))]
    fn optional_text_collapses_blank(
        #[case] input: Option<&str>,
        #[case] expected: Result<Option<String>, FieldError>,
    ) {
        assert_eq!(optional_text("bio", input, 10), expected);
    }

    #[rstest]
    fn field_errors_become_invalid_requests() {
        let error: Error = FieldError::TooLong { field: "name", max: 100 }.into();
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.message(), "name must be at most 100 characters");
        let details = error.details().expect("details");
        assert_eq!(details["field"], "name");
        assert_eq!(details["code"], "too_long");
    }

    #[rstest]
    fn finite_rejects_nan() {
        assert!(finite("speed", Some(f64::NAN)).is_err());
        assert_eq!(finite("speed", Some(1.5)), Ok(Some(1.5)));
    }
}
