use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::backend::RetrofitBackend;
use crate::models::{
    BuildingOverrides, CalculatorRequest, OptionQuote, RetrofitOption, RetrofitSubtype, WindowTier,
};
use crate::wizard::sequence::{Commit, RequestTicket};
use crate::wizard::state::WizardState;

/// One quote per offered upgrade, all for the same override set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsRequest {
    pub ticket: RequestTicket,
    pub building_id: String,
    pub subtypes: Vec<RetrofitSubtype>,
    pub overrides: BuildingOverrides,
}

impl OptionsRequest {
    /// Runs every quote concurrently and waits for all of them. A failed
    /// quote drops its option; the rest are still returned.
    pub async fn fetch(
        &self,
        backend: &dyn RetrofitBackend,
    ) -> Vec<RetrofitOption> {
        let requests: Vec<CalculatorRequest> = self
            .subtypes
            .iter()
            .map(|&subtype| {
                CalculatorRequest::new(self.building_id.clone(), subtype, self.overrides.clone())
            })
            .collect();

        let outcomes = join_all(requests.iter().map(|request| backend.run_calculator(request))).await;

        requests
            .iter()
            .zip(outcomes)
            .filter_map(|(request, outcome)| match outcome {
                Ok(result) => Some(RetrofitOption::new(request.subtype, OptionQuote::from(&result))),
                Err(e) => {
                    warn!(
                        building_id = %self.building_id,
                        subtype = %request.subtype,
                        "dropping option, quote failed: {}",
                        e
                    );
                    None
                }
            })
            .collect()
    }
}

/// Derives the upgrades on offer for the effective building and prices
/// them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionEnumerator;

impl OptionEnumerator {
    pub fn new() -> Self {
        Self
    }

    /// Upgrade subtypes for a window tier: single offers double and triple,
    /// double offers triple, anything else offers nothing.
    pub fn offered(tier: Option<WindowTier>) -> Vec<RetrofitSubtype> {
        WindowTier::upgrades(tier).to_vec()
    }

    /// Invalidates the current options and issues quotes for the current
    /// overrides. Needs a loaded building.
    pub fn issue(
        &self,
        state: &mut WizardState,
    ) -> Option<OptionsRequest> {
        let effective = state.effective_building()?;
        let tier = effective.window_tier();
        let building_id = state.loaded_building_id.clone()?;
        let subtypes = Self::offered(tier);

        state.options = None;
        let ticket = state.sequences.options.issue();
        debug!(
            building_id = %building_id,
            tier = ?tier,
            subtypes = ?subtypes,
            ticket = ticket.value(),
            "issuing option quotes"
        );
        Some(OptionsRequest {
            ticket,
            building_id,
            subtypes,
            overrides: state.overrides.clone(),
        })
    }

    /// Replaces the option list. The selection survives only when its
    /// subtype is still on offer.
    pub fn commit(
        &self,
        state: &mut WizardState,
        request: &OptionsRequest,
        options: Vec<RetrofitOption>,
    ) -> Commit {
        if !state.sequences.options.settle(request.ticket) {
            warn!(
                building_id = %request.building_id,
                ticket = request.ticket.value(),
                "discarding stale option quotes"
            );
            return Commit::Stale;
        }

        info!(
            building_id = %request.building_id,
            offered = request.subtypes.len(),
            priced = options.len(),
            "options ready"
        );

        let keep_selection = state
            .selected_option
            .is_some_and(|subtype| options.iter().any(|option| option.subtype == subtype));
        if !keep_selection && state.selected_option.is_some() {
            debug!("selected option no longer offered, clearing selection");
            state.reset_option_dependents();
        }

        state.options = Some(options);
        Commit::Applied
    }
}
