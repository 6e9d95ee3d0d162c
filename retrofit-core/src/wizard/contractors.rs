use tracing::{debug, info, warn};

use crate::backend::{BackendError, RetrofitBackend};
use crate::models::Contractor;
use crate::wizard::sequence::{Commit, RequestTicket};
use crate::wizard::state::WizardState;
use crate::wizard::step::Step;

pub const NO_CONTRACTORS_FOUND: &str = "No contractors found";

/// Directory lookup for one specialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractorsRequest {
    pub ticket: RequestTicket,
    pub specialization: String,
}

impl ContractorsRequest {
    pub async fn fetch(
        &self,
        backend: &dyn RetrofitBackend,
    ) -> Result<Vec<Contractor>, BackendError> {
        backend.list_contractors(&self.specialization).await
    }

    pub(crate) fn issue(
        state: &mut WizardState,
        specialization: &str,
    ) -> Self {
        let ticket = state.sequences.contractors.issue();
        debug!(specialization, ticket = ticket.value(), "issuing contractor lookup");
        Self {
            ticket,
            specialization: specialization.to_string(),
        }
    }

    /// A failed lookup is not an error for the user: the list is emptied
    /// and the step shows that nobody was found.
    pub(crate) fn commit(
        &self,
        state: &mut WizardState,
        outcome: Result<Vec<Contractor>, BackendError>,
    ) -> Commit {
        if !state.sequences.contractors.settle(self.ticket) {
            warn!(ticket = self.ticket.value(), "discarding stale contractor lookup");
            return Commit::Stale;
        }

        match outcome {
            Ok(contractors) => {
                info!(
                    specialization = %self.specialization,
                    count = contractors.len(),
                    "contractors loaded"
                );
                state.contractors = contractors;
                state.clear_error(Step::Contractors);
                Commit::Applied
            }
            Err(e) => {
                warn!(specialization = %self.specialization, "contractor lookup failed: {}", e);
                state.contractors.clear();
                state.set_error(Step::Contractors, NO_CONTRACTORS_FOUND);
                Commit::Failed
            }
        }
    }
}
