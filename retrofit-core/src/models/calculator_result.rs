use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{BuildingOverrides, RetrofitSubtype};

/// Body of a calculator invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalculatorRequest {
    pub building_id: String,
    #[serde(rename = "sub_type_of_retrofit")]
    pub subtype: RetrofitSubtype,
    pub overrides: BuildingOverrides,
}

impl CalculatorRequest {
    pub fn new(
        building_id: impl Into<String>,
        subtype: RetrofitSubtype,
        overrides: BuildingOverrides,
    ) -> Self {
        Self {
            building_id: building_id.into(),
            subtype,
            overrides,
        }
    }
}

/// Financial projection for one retrofit option, as returned by the
/// calculator service. Amounts are in euros.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CalculatorResult {
    #[serde(default)]
    pub total_sqm: Decimal,
    #[serde(default)]
    pub nr_units: Decimal,
    #[serde(default)]
    pub window_type: String,
    #[serde(default)]
    pub energy_costs_per_month: Decimal,
    #[serde(default)]
    pub rent_per_unit: Decimal,
    pub sub_type_of_retrofit: String,
    pub retrofit_cost_total: Decimal,
    pub retrofit_cost_total_after_subsidy: Decimal,
    #[serde(default)]
    pub energy_savings_per_month: Decimal,
    #[serde(default)]
    pub year_until_breakeven: Decimal,
    #[serde(default)]
    pub savings_per_unit: Decimal,
    #[serde(default)]
    pub rent_increase_per_unit: Decimal,
    #[serde(default)]
    pub tenant_savings_per_unit: Decimal,
    #[serde(default)]
    pub yearly_extra_income: Decimal,
    #[serde(default)]
    pub years_until_breakevent_rent_increase: Decimal,
    pub energy_savings_pct: Decimal,

    #[serde(
        rename = "years_until_break_even",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub years_until_break_even: Option<u32>,
    #[serde(
        rename = "months_until_break_even",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub months_until_break_even: Option<u32>,
}

impl CalculatorResult {
    /// The subtype this result was computed for, when the service echoed
    /// back a known tag.
    pub fn subtype(&self) -> Option<RetrofitSubtype> {
        RetrofitSubtype::parse(&self.sub_type_of_retrofit)
    }
}
