use tracing::{info, warn};

use crate::backend::{BackendError, RetrofitBackend};
use crate::wizard::sequence::{Commit, RequestTicket};
use crate::wizard::state::{BackendStatus, WizardState};

/// Availability check of the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthRequest {
    pub ticket: RequestTicket,
}

impl HealthRequest {
    pub async fn fetch(
        &self,
        backend: &dyn RetrofitBackend,
    ) -> Result<(), BackendError> {
        backend.health().await
    }

    pub(crate) fn issue(state: &mut WizardState) -> Self {
        state.backend_status = BackendStatus::Pending;
        Self {
            ticket: state.sequences.health.issue(),
        }
    }

    pub(crate) fn commit(
        &self,
        state: &mut WizardState,
        outcome: Result<(), BackendError>,
    ) -> Commit {
        if !state.sequences.health.settle(self.ticket) {
            return Commit::Stale;
        }

        match outcome {
            Ok(()) => {
                info!("backend ready");
                state.backend_status = BackendStatus::Ready;
                Commit::Applied
            }
            Err(e) => {
                warn!("backend health check failed: {}", e);
                state.backend_status = BackendStatus::Error(e.user_message());
                Commit::Failed
            }
        }
    }
}
