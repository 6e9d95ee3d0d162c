//! Break-even period presentation.
//!
//! The calculator reports the rent-increase break-even as fractional years
//! (`YearsUntilBreakeventRentIncrease`) and, in newer service versions, as
//! whole `years_until_break_even` / `months_until_break_even`. This module
//! turns either form into a years-and-months period.

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::CalculatorResult;

/// Whole years and months until the investment pays for itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakEven {
    pub years: u32,
    pub months: u32,
}

impl BreakEven {
    /// Splits fractional years into whole years and rounded months.
    ///
    /// Negative input is treated as zero. A fraction that rounds to twelve
    /// months rolls over into the next year.
    pub fn from_years(years: Decimal) -> Self {
        if years <= Decimal::ZERO {
            return Self::default();
        }

        let whole = years.trunc();
        let months = ((years - whole) * Decimal::from(12))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
            .unwrap_or(0);
        let whole = whole.to_u32().unwrap_or(u32::MAX);

        if months >= 12 {
            Self {
                years: whole.saturating_add(1),
                months: months - 12,
            }
        } else {
            Self {
                years: whole,
                months,
            }
        }
    }

    /// Uses the service's whole-number split when present, otherwise
    /// derives it from the fractional rent-increase break-even.
    pub fn from_result(result: &CalculatorResult) -> Self {
        let derived = Self::from_years(result.years_until_breakevent_rent_increase);
        Self {
            years: result.years_until_break_even.unwrap_or(derived.years),
            months: result.months_until_break_even.unwrap_or(derived.months),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0
    }
}

impl fmt::Display for BreakEven {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.is_zero() {
            f.write_str("—")
        } else {
            write!(f, "{} years, {} months", self.years, self.months)
        }
    }
}
