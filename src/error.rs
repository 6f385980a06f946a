//! Error kinds raised by the generation core.

use chrono::NaiveDate;
use thiserror::Error;

/// Failures surfaced by validation or by internal invariant checks.
///
/// Every input problem is reported before any record is generated, so a
/// caller never receives a partial dataset.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// `end_date` lies before `start_date`.
    #[error("invalid date range: end date {end} is before start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// A tunable is out of bounds (rate outside [0, 1], unknown site type, ...).
    #[error("invalid parameter `{field}`: {message}")]
    InvalidParameter { field: String, message: String },

    /// A record points at a site that is not in the registry. Always a bug.
    #[error("record references unknown site `{0}`")]
    UnresolvedSiteReference(String),
}

impl GenerationError {
    pub(crate) fn invalid_parameter(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_range_message_names_both_dates() {
        let err = GenerationError::InvalidRange {
            start: NaiveDate::from_ymd_opt(2023, 2, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        };
        let msg = err.to_string();
        assert!(msg.contains("2023-02-01"));
        assert!(msg.contains("2023-01-01"));
    }

    #[test]
    fn invalid_parameter_message_names_field() {
        let err = GenerationError::invalid_parameter("quality.missing_rate", "must be in [0, 1]");
        assert_eq!(
            err.to_string(),
            "invalid parameter `quality.missing_rate`: must be in [0, 1]"
        );
    }
}
