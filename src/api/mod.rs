pub mod balance;
pub mod calendar;
pub mod entry;
pub mod envelope;
pub mod reporting;
pub mod user;

use std::str::FromStr;

use crate::error::AppError;

/// Parses an optional form field. Blank values count as absent.
pub(crate) fn optional_field<T: FromStr>(
    raw: Option<&str>,
    error: &'static str,
) -> Result<Option<T>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| AppError::validation(error)),
    }
}

pub(crate) fn required_field<T: FromStr>(
    raw: Option<&str>,
    error: &'static str,
) -> Result<T, AppError> {
    optional_field(raw, error)?.ok_or_else(|| AppError::validation(error))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_absent() {
        assert_eq!(optional_field::<u64>(None, "bad").unwrap(), None);
        assert_eq!(optional_field::<u64>(Some("  "), "bad").unwrap(), None);
        assert_eq!(optional_field::<u64>(Some(" 12 "), "bad").unwrap(), Some(12));
    }

    #[test]
    fn malformed_fields_are_rejected() {
        let err = optional_field::<u32>(Some("twelve"), "Invalid month").unwrap_err();
        assert_eq!(err.to_string(), "Invalid month");
        assert!(required_field::<u64>(Some(""), "Missing user").is_err());
    }
}
