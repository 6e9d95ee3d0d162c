//! Common utility functions for presenting calculator figures.
//!
//! This module provides the rounding and number formatting shared by the
//! option cards, the break-even report and the contractor listing.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use retrofit_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Formats a euro amount the way German readers expect it: `.` groups
/// thousands, `,` separates the two decimal places.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use retrofit_core::calculations::common::format_euro;
///
/// assert_eq!(format_euro(dec!(1234.5)), "1.234,50");
/// assert_eq!(format_euro(dec!(-98765432.105)), "-98.765.432,11");
/// ```
pub fn format_euro(value: Decimal) -> String {
    let rounded = round_half_up(value);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let plain = format!("{:.2}", rounded.abs());
    let (whole, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped},{fraction}")
}

/// Formats a percentage with at most one decimal place, dropping a
/// trailing `.0`.
pub fn format_percent(value: Decimal) -> String {
    let rounded = value
        .round_dp_with_strategy(1, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    format!("{rounded}%")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        let result = round_half_up(dec!(123.454));

        assert_eq!(result, dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        let result = round_half_up(dec!(123.455));

        assert_eq!(result, dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        let result = round_half_up(dec!(-123.455));

        assert_eq!(result, dec!(-123.46)); // Away from zero
    }

    // =========================================================================
    // format_euro tests
    // =========================================================================

    #[test]
    fn format_euro_pads_two_decimals() {
        assert_eq!(format_euro(dec!(7)), "7,00");
    }

    #[test]
    fn format_euro_groups_thousands() {
        assert_eq!(format_euro(dec!(48210.3)), "48.210,30");
        assert_eq!(format_euro(dec!(1000000)), "1.000.000,00");
    }

    #[test]
    fn format_euro_leaves_three_digit_values_ungrouped() {
        assert_eq!(format_euro(dec!(856.75)), "856,75");
    }

    #[test]
    fn format_euro_rounds_half_up() {
        assert_eq!(format_euro(dec!(0.005)), "0,01");
    }

    #[test]
    fn format_euro_handles_negative_values() {
        assert_eq!(format_euro(dec!(-1234.5)), "-1.234,50");
    }

    #[test]
    fn format_euro_negative_zero_has_no_sign() {
        assert_eq!(format_euro(dec!(-0.001)), "0,00");
    }

    // =========================================================================
    // format_percent tests
    // =========================================================================

    #[test]
    fn format_percent_drops_trailing_zero() {
        assert_eq!(format_percent(dec!(18.0)), "18%");
    }

    #[test]
    fn format_percent_keeps_one_decimal() {
        assert_eq!(format_percent(dec!(22.46)), "22.5%");
    }
}
