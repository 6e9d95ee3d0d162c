use tracing::{debug, info, warn};

use crate::backend::{BackendError, RetrofitBackend};
use crate::models::{CalculatorRequest, CalculatorResult};
use crate::wizard::sequence::{Commit, RequestTicket};
use crate::wizard::state::WizardState;
use crate::wizard::step::Step;

/// Break-even calculation for the selected option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculationRequest {
    pub ticket: RequestTicket,
    pub request: CalculatorRequest,
}

impl CalculationRequest {
    pub async fn fetch(
        &self,
        backend: &dyn RetrofitBackend,
    ) -> Result<CalculatorResult, BackendError> {
        backend.run_calculator(&self.request).await
    }

    /// Issues a calculation for the selected building and option with the
    /// full override set. Without both there is nothing to calculate.
    pub(crate) fn issue(state: &mut WizardState) -> Option<Self> {
        let building_id = state.loaded_building_id.clone()?;
        let subtype = state.selected_option?;

        let ticket = state.sequences.calculation.issue();
        debug!(
            building_id = %building_id,
            subtype = %subtype,
            ticket = ticket.value(),
            "issuing break-even calculation"
        );
        Some(Self {
            ticket,
            request: CalculatorRequest::new(building_id, subtype, state.overrides.clone()),
        })
    }

    /// Replaces any previous result in full. Calculating is an options-step
    /// action, so a failure is reported there.
    pub(crate) fn commit(
        &self,
        state: &mut WizardState,
        outcome: Result<CalculatorResult, BackendError>,
    ) -> Commit {
        if !state.sequences.calculation.settle(self.ticket) {
            warn!(ticket = self.ticket.value(), "discarding stale calculation");
            return Commit::Stale;
        }

        match outcome {
            Ok(result) => {
                info!(
                    subtype = %self.request.subtype,
                    savings_pct = %result.energy_savings_pct,
                    "break-even calculated"
                );
                state.result = Some(result);
                state.clear_error(Step::Options);
                Commit::Applied
            }
            Err(e) => {
                warn!(subtype = %self.request.subtype, "calculation failed: {}", e);
                state.set_error(Step::Options, e.user_message());
                Commit::Failed
            }
        }
    }
}
