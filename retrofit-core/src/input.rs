//! Parsing of free-text form input.

use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a form value cannot be parsed as a number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseNumberError {
    #[error("invalid decimal '{input}': {reason}")]
    Decimal { input: String, reason: String },

    #[error("invalid whole number '{input}'")]
    Whole { input: String },
}

/// Normalizes input for number parsing: trims whitespace and removes commas (thousands separator).
fn normalize_number_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a string into an optional [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`).
/// Empty or whitespace-only input yields `None`, which callers treat as
/// "clear this value".
pub fn parse_optional_decimal(s: &str) -> Result<Option<Decimal>, ParseNumberError> {
    let normalized = normalize_number_input(s);
    if normalized.is_empty() {
        return Ok(None);
    }
    normalized.parse().map(Some).map_err(|e: rust_decimal::Error| {
        tracing::warn!(input = %s, "invalid decimal: {}", e);
        ParseNumberError::Decimal {
            input: s.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Parses a string into an optional whole number.
///
/// Accepts a trailing `.0` fraction (`"31.0"`) since number inputs often
/// produce one.
pub fn parse_optional_whole<T>(s: &str) -> Result<Option<T>, ParseNumberError>
where
    T: TryFrom<i64>,
{
    let Some(value) = parse_optional_decimal(s).map_err(|_| ParseNumberError::Whole {
        input: s.to_string(),
    })?
    else {
        return Ok(None);
    };

    let whole = if value.fract().is_zero() {
        i64::try_from(value).ok()
    } else {
        None
    };

    whole
        .and_then(|w| T::try_from(w).ok())
        .map(Some)
        .ok_or_else(|| {
            tracing::warn!(input = %s, "invalid whole number");
            ParseNumberError::Whole {
                input: s.to_string(),
            }
        })
}
