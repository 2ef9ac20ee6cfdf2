//! Field-level validation shared by entity constructors.

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reasons an entity constructor refuses its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Public identifiers must be non-nil UUIDs.
    NilPublicId,
    /// Required text field is empty after trimming.
    BlankField(&'static str),
    /// Category fee is below zero.
    NegativeFee(Decimal),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilPublicId => write!(f, "public id must not be nil"),
            Self::BlankField(field) => write!(f, "`{field}` must not be blank"),
            Self::NegativeFee(fee) => write!(f, "fee must not be negative, got {fee}"),
        }
    }
}

impl Error for ValidationError {}

/// Trims `value` and rejects it when nothing is left.
pub(crate) fn require_text(
    field: &'static str,
    value: impl Into<String>,
) -> Result<String, ValidationError> {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    if trimmed.len() == value.len() {
        return Ok(value);
    }
    Ok(trimmed.to_string())
}

/// Timestamps are stored as epoch milliseconds; drop anything finer so a
/// value read back compares equal to the one written.
pub(crate) fn trim_millis(value: DateTime<Utc>) -> DateTime<Utc> {
    value.trunc_subsecs(3)
}

#[cfg(test)]
mod tests {
    use super::{require_text, trim_millis, ValidationError};
    use chrono::{TimeZone, Timelike, Utc};

    #[test]
    fn require_text_trims_surrounding_whitespace() {
        assert_eq!(require_text("name", "  Late  ").unwrap(), "Late");
        assert_eq!(require_text("name", "Late").unwrap(), "Late");
    }

    #[test]
    fn require_text_rejects_whitespace_only() {
        assert_eq!(
            require_text("line_id", " \t\n"),
            Err(ValidationError::BlankField("line_id"))
        );
    }

    #[test]
    fn trim_millis_drops_sub_millisecond_precision() {
        let precise = Utc
            .with_ymd_and_hms(2024, 10, 23, 13, 4, 24)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        assert_eq!(trim_millis(precise).nanosecond(), 123_000_000);
    }
}
