use tracing::{debug, info, warn};

use crate::backend::{BackendError, RetrofitBackend};
use crate::models::{Building, BuildingOverrides, CalculatorRequest, CalculatorResult, RetrofitSubtype};
use crate::wizard::sequence::{Commit, RequestTicket};
use crate::wizard::state::WizardState;
use crate::wizard::step::Step;

/// Building attributes together with the quote used as their baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingDetail {
    pub building: Building,
    pub baseline_result: CalculatorResult,
}

/// Load of one building's details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingLoadRequest {
    pub ticket: RequestTicket,
    pub building_id: String,
    pub baseline: CalculatorRequest,
}

impl BuildingLoadRequest {
    /// Fetches the attributes and the baseline quote concurrently. Either
    /// failure fails the whole load.
    pub async fn fetch(
        &self,
        backend: &dyn RetrofitBackend,
    ) -> Result<BuildingDetail, BackendError> {
        let (building, baseline_result) = tokio::try_join!(
            backend.get_building(&self.building_id),
            backend.run_calculator(&self.baseline),
        )?;

        Ok(BuildingDetail {
            building,
            baseline_result,
        })
    }
}

/// Loads the selected building once per distinct selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildingDetailLoader {
    baseline_subtype: RetrofitSubtype,
}

impl BuildingDetailLoader {
    pub fn new(baseline_subtype: RetrofitSubtype) -> Self {
        Self { baseline_subtype }
    }

    /// Whether the details for the current selection are already in state.
    pub fn is_loaded(
        &self,
        state: &WizardState,
    ) -> bool {
        match state.address.building_id() {
            Some(id) => {
                state.baseline.is_some() && state.loaded_building_id.as_deref() == Some(id)
            }
            None => false,
        }
    }

    /// Issues a load for the selected building, unless there is no complete
    /// selection or it is loaded already.
    pub fn issue(
        &self,
        state: &mut WizardState,
    ) -> Option<BuildingLoadRequest> {
        if self.is_loaded(state) {
            return None;
        }
        let building_id = state.address.building_id()?.to_string();

        let ticket = state.sequences.building.issue();
        debug!(building_id = %building_id, ticket = ticket.value(), "issuing building load");
        Some(BuildingLoadRequest {
            ticket,
            baseline: CalculatorRequest::new(
                building_id.clone(),
                self.baseline_subtype,
                BuildingOverrides::default(),
            ),
            building_id,
        })
    }

    /// Stores both payloads, or neither. Failures land on the address step,
    /// which is where the user stays.
    pub fn commit(
        &self,
        state: &mut WizardState,
        request: &BuildingLoadRequest,
        outcome: Result<BuildingDetail, BackendError>,
    ) -> Commit {
        if !state.sequences.building.settle(request.ticket) {
            warn!(
                building_id = %request.building_id,
                ticket = request.ticket.value(),
                "discarding stale building load"
            );
            return Commit::Stale;
        }

        match outcome {
            Ok(detail) => {
                info!(building_id = %request.building_id, "building loaded");
                state.baseline = Some(detail.building);
                state.baseline_result = Some(detail.baseline_result);
                state.loaded_building_id = Some(request.building_id.clone());
                state.options = None;
                state.clear_error(Step::Address);
                Commit::Applied
            }
            Err(e) => {
                warn!(building_id = %request.building_id, "building load failed: {}", e);
                state.set_error(Step::Address, e.user_message());
                Commit::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::BuildingStub;

    fn state_with_selection(id: &str) -> WizardState {
        let mut state = WizardState::new("Berlin");
        state.address.postal_code = "10317".to_string();
        state.address.street = "Weserstr.".to_string();
        state.address.building = Some(BuildingStub {
            building_id: id.to_string(),
            display_address: "Weserstr. 12".to_string(),
        });
        state
    }

    fn detail() -> BuildingDetail {
        BuildingDetail {
            building: Building {
                building_id: Some("B-12".to_string()),
                window_type: Some("Single Pane".to_string()),
                total_area_m2: Some(dec!(2523)),
                ..Building::default()
            },
            baseline_result: CalculatorResult {
                total_sqm: dec!(2523),
                nr_units: dec!(31),
                window_type: "Single-pane".to_string(),
                energy_costs_per_month: dec!(1650.5),
                rent_per_unit: dec!(856.75),
                sub_type_of_retrofit: "Window replacement - triple glazing".to_string(),
                retrofit_cost_total: dec!(150000),
                retrofit_cost_total_after_subsidy: dec!(97500),
                energy_savings_per_month: dec!(380),
                year_until_breakeven: dec!(21.4),
                savings_per_unit: dec!(12.26),
                rent_increase_per_unit: dec!(10),
                tenant_savings_per_unit: dec!(2.26),
                yearly_extra_income: dec!(3720),
                years_until_breakevent_rent_increase: dec!(26.2),
                energy_savings_pct: dec!(23),
                years_until_break_even: None,
                months_until_break_even: None,
            },
        }
    }

    #[test]
    fn incomplete_address_issues_no_load() {
        let mut state = WizardState::new("Berlin");
        state.address.postal_code = "10317".to_string();

        let loader = BuildingDetailLoader::new(RetrofitSubtype::TripleGlazing);

        assert_eq!(loader.issue(&mut state), None);
    }

    #[test]
    fn baseline_quote_uses_configured_subtype_without_overrides() {
        let mut state = state_with_selection("B-12");
        let loader = BuildingDetailLoader::new(RetrofitSubtype::TripleGlazing);

        let request = loader.issue(&mut state).unwrap();

        assert_eq!(request.building_id, "B-12");
        assert_eq!(request.baseline.subtype, RetrofitSubtype::TripleGlazing);
        assert!(request.baseline.overrides.is_empty());
    }

    #[test]
    fn loaded_building_is_not_issued_again() {
        let mut state = state_with_selection("B-12");
        let loader = BuildingDetailLoader::new(RetrofitSubtype::TripleGlazing);
        let request = loader.issue(&mut state).unwrap();

        assert_eq!(loader.commit(&mut state, &request, Ok(detail())), Commit::Applied);

        assert!(loader.is_loaded(&state));
        assert_eq!(loader.issue(&mut state), None);
    }

    #[test]
    fn failed_load_keeps_previous_state_and_reports_on_address_step() {
        let mut state = state_with_selection("B-12");
        let loader = BuildingDetailLoader::new(RetrofitSubtype::TripleGlazing);
        let request = loader.issue(&mut state).unwrap();

        let commit = loader.commit(
            &mut state,
            &request,
            Err(BackendError::Status {
                status: 500,
                body: "Calculator unavailable".to_string(),
            }),
        );

        assert_eq!(commit, Commit::Failed);
        assert!(state.baseline().is_none());
        assert!(state.baseline_result().is_none());
        assert_eq!(state.error(Step::Address), Some("Calculator unavailable"));
    }

    #[test]
    fn load_for_replaced_selection_is_discarded() {
        let mut state = state_with_selection("B-12");
        let loader = BuildingDetailLoader::new(RetrofitSubtype::TripleGlazing);
        let request = loader.issue(&mut state).unwrap();

        state.reset_building_dependents();

        assert_eq!(loader.commit(&mut state, &request, Ok(detail())), Commit::Stale);
        assert!(state.baseline().is_none());
    }
}
