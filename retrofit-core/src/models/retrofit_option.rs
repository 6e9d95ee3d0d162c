use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{CalculatorResult, RetrofitSubtype};

/// Headline figures of a calculator quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionQuote {
    pub savings_pct: Decimal,
    pub baseline_cost: Decimal,
    pub subsidized_cost: Decimal,
}

impl From<&CalculatorResult> for OptionQuote {
    fn from(result: &CalculatorResult) -> Self {
        Self {
            savings_pct: result.energy_savings_pct,
            baseline_cost: result.retrofit_cost_total,
            subsidized_cost: result.retrofit_cost_total_after_subsidy,
        }
    }
}

/// An upgrade offered for the current building, with its quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrofitOption {
    pub subtype: RetrofitSubtype,
    pub label: String,
    pub quote: OptionQuote,
}

impl RetrofitOption {
    pub fn new(
        subtype: RetrofitSubtype,
        quote: OptionQuote,
    ) -> Self {
        Self {
            subtype,
            label: subtype.label().to_string(),
            quote,
        }
    }
}
