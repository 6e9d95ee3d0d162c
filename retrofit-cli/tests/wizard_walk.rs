//! End-to-end walks through the wizard against an in-memory backend.

use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use retrofit_cli::app::{self, WalkPlan};
use retrofit_cli::report;
use retrofit_core::{
    BackendError, Building, BuildingStub, CalculatorRequest, CalculatorResult, Contractor,
    RetrofitBackend, RetrofitSubtype, Step, WizardConfig, WizardController,
};
use rust_decimal_macros::dec;

struct TwoBuildings {
    directory_down: bool,
}

#[async_trait]
impl RetrofitBackend for TwoBuildings {
    async fn health(&self) -> Result<(), BackendError> {
        Ok(())
    }

    async fn list_streets(
        &self,
        _postal_code: &str,
    ) -> Result<Vec<String>, BackendError> {
        Ok(vec!["Weserstr.".to_string()])
    }

    async fn list_buildings(
        &self,
        _postal_code: &str,
        _street: &str,
    ) -> Result<Vec<BuildingStub>, BackendError> {
        Ok(vec![
            BuildingStub {
                building_id: "B-0012".to_string(),
                display_address: "Weserstr. 12".to_string(),
            },
            BuildingStub {
                building_id: "B-0014".to_string(),
                display_address: "Weserstr. 14".to_string(),
            },
        ])
    }

    async fn get_building(
        &self,
        building_id: &str,
    ) -> Result<Building, BackendError> {
        Ok(Building {
            building_id: Some(building_id.to_string()),
            num_units: Some(31),
            window_type: Some("Single Pane".to_string()),
            rent_per_unit: Some(dec!(856.75)),
            ..Building::default()
        })
    }

    async fn run_calculator(
        &self,
        request: &CalculatorRequest,
    ) -> Result<CalculatorResult, BackendError> {
        let (pct, total, subsidized) = match request.subtype {
            RetrofitSubtype::DoubleGlazing => (dec!(18), dec!(120000), dec!(78000)),
            RetrofitSubtype::TripleGlazing => (dec!(23), dec!(150000), dec!(97500)),
        };
        Ok(CalculatorResult {
            total_sqm: dec!(2523),
            nr_units: dec!(31),
            window_type: "Single-pane".to_string(),
            energy_costs_per_month: dec!(1650.5),
            rent_per_unit: request.overrides.rent_per_unit.unwrap_or(dec!(856.75)),
            sub_type_of_retrofit: request.subtype.tag().to_string(),
            retrofit_cost_total: total,
            retrofit_cost_total_after_subsidy: subsidized,
            energy_savings_per_month: dec!(300),
            year_until_breakeven: dec!(21.6),
            savings_per_unit: dec!(9.68),
            rent_increase_per_unit: dec!(8),
            tenant_savings_per_unit: dec!(1.68),
            yearly_extra_income: dec!(2976),
            years_until_breakevent_rent_increase: dec!(21.5),
            energy_savings_pct: pct,
            years_until_break_even: None,
            months_until_break_even: None,
        })
    }

    async fn list_contractors(
        &self,
        _specialization: &str,
    ) -> Result<Vec<Contractor>, BackendError> {
        if self.directory_down {
            return Err(BackendError::Connection("connection refused".to_string()));
        }
        Ok(vec![Contractor {
            company_name: Some("Kiez Fenster GmbH".to_string()),
            specialization: Some("window".to_string()),
            ..Contractor::default()
        }])
    }
}

fn controller(directory_down: bool) -> WizardController {
    WizardController::new(
        Arc::new(TwoBuildings { directory_down }),
        WizardConfig::default(),
    )
}

#[tokio::test]
async fn test_full_walk_reaches_contractors() {
    let mut controller = controller(false);
    let plan = WalkPlan {
        building_id: Some("B-0014".to_string()),
        overrides: vec![("RentPerUnit".to_string(), "900".to_string())],
        option: Some(RetrofitSubtype::TripleGlazing),
        ..WalkPlan::new("10317")
    };

    app::walk(&mut controller, &plan).await.expect("walk should finish");

    let state = controller.state();
    assert_eq!(state.step(), Step::Contractors);
    assert_eq!(state.address().building_id(), Some("B-0014"));
    assert_eq!(state.overrides().rent_per_unit, Some(dec!(900)));
    let result = state.result().expect("result");
    assert_eq!(result.subtype(), Some(RetrofitSubtype::TripleGlazing));
    assert_eq!(result.rent_per_unit, dec!(900));
    assert_eq!(state.contractors().len(), 1);

    let text = report::render(state);
    assert!(text.contains("Weserstr. 14, 10317 Berlin"));
    assert!(text.contains("> Triple glazing"));
    assert!(text.contains("Kiez Fenster GmbH"));
}

#[tokio::test]
async fn test_ambiguous_building_stops_on_address_step() {
    let mut controller = controller(false);

    let err = app::walk(&mut controller, &WalkPlan::new("10317"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("B-0012 (Weserstr. 12)"));
    assert_eq!(controller.step(), Step::Address);
    assert_eq!(controller.state().buildings().len(), 2);
}

#[tokio::test]
async fn test_stop_at_options_skips_calculation() {
    let mut controller = controller(false);
    let plan = WalkPlan {
        building_id: Some("B-0012".to_string()),
        stop_at: Step::Options,
        ..WalkPlan::new("10317")
    };

    app::walk(&mut controller, &plan).await.expect("walk should finish");

    assert_eq!(controller.step(), Step::Options);
    assert_eq!(
        controller.state().selected_subtype(),
        Some(RetrofitSubtype::DoubleGlazing)
    );
    assert!(controller.state().result().is_none());
}

#[tokio::test]
async fn test_directory_outage_is_reported_not_fatal() {
    let mut controller = controller(true);
    let plan = WalkPlan {
        building_id: Some("B-0012".to_string()),
        ..WalkPlan::new("10317")
    };

    app::walk(&mut controller, &plan).await.expect("walk should finish");

    assert_eq!(controller.step(), Step::Contractors);
    assert_eq!(
        controller.state().error(Step::Contractors),
        Some("No contractors found")
    );
    assert!(report::render(controller.state()).contains("  No contractors found"));
}

#[tokio::test]
async fn test_unknown_override_field_is_rejected() {
    let mut controller = controller(false);
    let plan = WalkPlan {
        building_id: Some("B-0012".to_string()),
        overrides: vec![("balcony_count".to_string(), "3".to_string())],
        ..WalkPlan::new("10317")
    };

    let err = app::walk(&mut controller, &plan).await.unwrap_err();

    assert!(format!("{err:#}").contains("balcony_count"));
    assert_eq!(controller.step(), Step::Options);
}
