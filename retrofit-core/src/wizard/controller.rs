use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::backend::{BackendError, RetrofitBackend};
use crate::models::{BuildingField, BuildingStub, CalculatorResult, Contractor, FieldError, RetrofitOption, RetrofitSubtype};
use crate::wizard::address::{AddressResolver, BuildingsRequest, StreetsRequest};
use crate::wizard::building::{BuildingDetail, BuildingDetailLoader, BuildingLoadRequest};
use crate::wizard::calculation::CalculationRequest;
use crate::wizard::config::WizardConfig;
use crate::wizard::contractors::ContractorsRequest;
use crate::wizard::health::HealthRequest;
use crate::wizard::options::{OptionEnumerator, OptionsRequest};
use crate::wizard::sequence::Commit;
use crate::wizard::state::{BackendStatus, WizardState};
use crate::wizard::step::Step;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    /// The data the next step depends on is missing or still loading.
    #[error("cannot leave {step}: {missing}")]
    NotReady { step: Step, missing: &'static str },

    /// A remote call failed; `message` is also in the step's error slot.
    #[error("{message}")]
    Remote { step: Step, message: String },

    #[error("building '{0}' is not among the candidates")]
    UnknownBuilding(String),

    #[error("'{0}' is not offered for this building")]
    OptionNotOffered(RetrofitSubtype),

    #[error(transparent)]
    Field(#[from] FieldError),
}

/// Drives the wizard: owns its state, decides step transitions and issues
/// the remote calls each step depends on.
///
/// Every remote call comes in three phases. `issue_*` mutates state and
/// hands back a request (or `None` when there is nothing to ask), the
/// request's `fetch` talks to the backend without touching state, and
/// `commit_*` applies the answer unless a newer request superseded it.
/// The `async` helpers run all three in order.
pub struct WizardController {
    state: WizardState,
    backend: Arc<dyn RetrofitBackend>,
    config: WizardConfig,
    resolver: AddressResolver,
    loader: BuildingDetailLoader,
    enumerator: OptionEnumerator,
}

impl WizardController {
    pub fn new(
        backend: Arc<dyn RetrofitBackend>,
        config: WizardConfig,
    ) -> Self {
        Self {
            state: WizardState::new(config.default_city.clone()),
            resolver: AddressResolver::new(config.min_postal_code_len),
            loader: BuildingDetailLoader::new(config.baseline_subtype),
            enumerator: OptionEnumerator::new(),
            backend,
            config,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    /// Handle for running a request's `fetch` outside the controller.
    pub fn backend(&self) -> Arc<dyn RetrofitBackend> {
        Arc::clone(&self.backend)
    }

    pub fn step(&self) -> Step {
        self.state.step
    }

    fn remote_error(
        &self,
        step: Step,
    ) -> WizardError {
        WizardError::Remote {
            step,
            message: self.state.error(step).unwrap_or_default().to_string(),
        }
    }

    fn settled(
        &self,
        commit: Commit,
        step: Step,
    ) -> Result<(), WizardError> {
        match commit {
            Commit::Failed => Err(self.remote_error(step)),
            Commit::Applied | Commit::Stale => Ok(()),
        }
    }

    // ── backend status ─────────────────────────────────────────────────────

    pub fn issue_health_check(&mut self) -> HealthRequest {
        HealthRequest::issue(&mut self.state)
    }

    pub fn commit_health_check(
        &mut self,
        request: &HealthRequest,
        outcome: Result<(), BackendError>,
    ) -> Commit {
        request.commit(&mut self.state, outcome)
    }

    /// Checks the backend and records whether it is usable.
    pub async fn check_backend(&mut self) -> &BackendStatus {
        let request = self.issue_health_check();
        let outcome = request.fetch(self.backend.as_ref()).await;
        self.commit_health_check(&request, outcome);
        &self.state.backend_status
    }

    // ── step 1: address ────────────────────────────────────────────────────

    pub fn issue_postal_code(
        &mut self,
        postal_code: &str,
    ) -> Option<StreetsRequest> {
        self.resolver.set_postal_code(&mut self.state, postal_code)
    }

    pub fn commit_streets(
        &mut self,
        request: &StreetsRequest,
        outcome: Result<Vec<String>, BackendError>,
    ) -> Commit {
        self.resolver.commit_streets(&mut self.state, request, outcome)
    }

    /// Sets the postal code and loads its streets. Codes below the minimum
    /// length are stored without a lookup.
    pub async fn set_postal_code(
        &mut self,
        postal_code: &str,
    ) -> Result<&[String], WizardError> {
        if let Some(request) = self.issue_postal_code(postal_code) {
            let outcome = request.fetch(self.backend.as_ref()).await;
            let commit = self.commit_streets(&request, outcome);
            self.settled(commit, Step::Address)?;
        }
        Ok(self.state.streets())
    }

    pub fn issue_street(
        &mut self,
        street: &str,
    ) -> Option<BuildingsRequest> {
        self.resolver.set_street(&mut self.state, street)
    }

    pub fn commit_buildings(
        &mut self,
        request: &BuildingsRequest,
        outcome: Result<Vec<BuildingStub>, BackendError>,
    ) -> Commit {
        self.resolver.commit_buildings(&mut self.state, request, outcome)
    }

    /// Sets the street and loads its buildings. A single building is
    /// selected on the spot.
    pub async fn set_street(
        &mut self,
        street: &str,
    ) -> Result<&[BuildingStub], WizardError> {
        if let Some(request) = self.issue_street(street) {
            let outcome = request.fetch(self.backend.as_ref()).await;
            let commit = self.commit_buildings(&request, outcome);
            self.settled(commit, Step::Address)?;
        }
        Ok(self.state.buildings())
    }

    pub fn select_building(
        &mut self,
        building_id: &str,
    ) -> Result<(), WizardError> {
        if self.resolver.select_building(&mut self.state, building_id) {
            Ok(())
        } else {
            Err(WizardError::UnknownBuilding(building_id.to_string()))
        }
    }

    // ── step 2: building details and options ───────────────────────────────

    pub fn issue_building_load(&mut self) -> Option<BuildingLoadRequest> {
        self.loader.issue(&mut self.state)
    }

    pub fn commit_building_load(
        &mut self,
        request: &BuildingLoadRequest,
        outcome: Result<BuildingDetail, BackendError>,
    ) -> Commit {
        self.loader.commit(&mut self.state, request, outcome)
    }

    pub fn issue_options(&mut self) -> Option<OptionsRequest> {
        self.enumerator.issue(&mut self.state)
    }

    pub fn commit_options(
        &mut self,
        request: &OptionsRequest,
        options: Vec<RetrofitOption>,
    ) -> Commit {
        self.enumerator.commit(&mut self.state, request, options)
    }

    async fn refresh_options(&mut self) {
        if let Some(request) = self.issue_options() {
            let options = request.fetch(self.backend.as_ref()).await;
            self.commit_options(&request, options);
        }
    }

    /// Stores an override typed into the building form. A change discards
    /// the calculation and, once a building is loaded, re-derives the
    /// options.
    pub fn issue_override(
        &mut self,
        field: BuildingField,
        text: &str,
    ) -> Result<Option<OptionsRequest>, WizardError> {
        if !self.state.overrides.set_text(field, text)? {
            return Ok(None);
        }
        debug!(field = %field, value = text, "override changed");
        self.state.discard_result();
        Ok(self.issue_options())
    }

    pub async fn set_override(
        &mut self,
        field: BuildingField,
        text: &str,
    ) -> Result<(), WizardError> {
        if let Some(request) = self.issue_override(field, text)? {
            let options = request.fetch(self.backend.as_ref()).await;
            self.commit_options(&request, options);
        }
        Ok(())
    }

    /// [`set_override`](Self::set_override) addressed by form key.
    pub async fn set_override_by_key(
        &mut self,
        key: &str,
        text: &str,
    ) -> Result<(), WizardError> {
        let field = BuildingField::from_key(key)
            .ok_or_else(|| FieldError::UnknownField(key.to_string()))?;
        self.set_override(field, text).await
    }

    pub fn select_option(
        &mut self,
        subtype: RetrofitSubtype,
    ) -> Result<(), WizardError> {
        let offered = self
            .state
            .options()
            .is_some_and(|options| options.iter().any(|option| option.subtype == subtype));
        if !offered {
            return Err(WizardError::OptionNotOffered(subtype));
        }

        if self.state.selected_option != Some(subtype) {
            debug!(subtype = %subtype, "option selected");
            self.state.selected_option = Some(subtype);
            self.state.discard_result();
        }
        Ok(())
    }

    // ── step 3: break-even ─────────────────────────────────────────────────

    pub fn issue_calculation(&mut self) -> Option<CalculationRequest> {
        CalculationRequest::issue(&mut self.state)
    }

    pub fn commit_calculation(
        &mut self,
        request: &CalculationRequest,
        outcome: Result<CalculatorResult, BackendError>,
    ) -> Commit {
        request.commit(&mut self.state, outcome)
    }

    /// Runs the break-even calculation for the selected option.
    pub async fn calculate(&mut self) -> Result<&CalculatorResult, WizardError> {
        let request = self.issue_calculation().ok_or(WizardError::NotReady {
            step: Step::Options,
            missing: "no retrofit option selected",
        })?;
        let outcome = request.fetch(self.backend.as_ref()).await;
        let commit = self.commit_calculation(&request, outcome);
        self.settled(commit, Step::Options)?;

        self.state.result().ok_or(WizardError::NotReady {
            step: Step::Results,
            missing: "calculation superseded",
        })
    }

    // ── step 4: contractors ────────────────────────────────────────────────

    pub fn issue_contractors(&mut self) -> ContractorsRequest {
        ContractorsRequest::issue(&mut self.state, &self.config.specialization)
    }

    pub fn commit_contractors(
        &mut self,
        request: &ContractorsRequest,
        outcome: Result<Vec<Contractor>, BackendError>,
    ) -> Commit {
        request.commit(&mut self.state, outcome)
    }

    async fn refresh_contractors(&mut self) {
        let request = self.issue_contractors();
        let outcome = request.fetch(self.backend.as_ref()).await;
        self.commit_contractors(&request, outcome);
    }

    // ── navigation ─────────────────────────────────────────────────────────

    /// Whether the data the next step needs is in place.
    pub fn can_advance(&self) -> bool {
        if self.state.is_loading() {
            return false;
        }
        match self.state.step {
            Step::Address => self.state.address.is_complete(),
            Step::Options => self.state.options.is_some(),
            Step::Results => self.state.result.is_some(),
            Step::Contractors => false,
        }
    }

    /// Moves one step forward. A no-op on the last step.
    pub async fn advance(&mut self) -> Result<(), WizardError> {
        match self.state.step.next() {
            Some(next) => self.go_to_step(next).await,
            None => {
                debug!("already on the last step");
                Ok(())
            }
        }
    }

    /// Moves one step back. Loaded data is kept.
    pub fn back(&mut self) {
        if let Some(previous) = self.state.step.previous() {
            self.leave_to(previous);
        }
    }

    /// Jumps to `target`.
    ///
    /// Going back always succeeds and keeps loaded data. Going forward
    /// checks the gate of every step on the way; entering the options step
    /// loads the selected building and its options if they are missing,
    /// and entering the contractor step refreshes the directory. When a
    /// gate fails the wizard stays where it was.
    pub async fn go_to_step(
        &mut self,
        target: Step,
    ) -> Result<(), WizardError> {
        let from = self.state.step;
        if target <= from {
            if target < from {
                self.leave_to(target);
            }
            return Ok(());
        }

        let mut next = from.next();
        while let Some(step) = next.filter(|step| *step <= target) {
            self.prepare(step).await?;
            next = step.next();
        }

        self.leave_to(target);
        if target == Step::Contractors {
            self.refresh_contractors().await;
        }
        Ok(())
    }

    /// Makes sure `step` can be entered.
    async fn prepare(
        &mut self,
        step: Step,
    ) -> Result<(), WizardError> {
        match step {
            Step::Address => Ok(()),
            Step::Options => {
                if !self.state.address.is_complete() {
                    return Err(WizardError::NotReady {
                        step: Step::Address,
                        missing: "no building selected",
                    });
                }
                if let Some(request) = self.issue_building_load() {
                    let outcome = request.fetch(self.backend.as_ref()).await;
                    let commit = self.commit_building_load(&request, outcome);
                    self.settled(commit, Step::Address)?;
                }
                if !self.loader.is_loaded(&self.state) {
                    return Err(WizardError::NotReady {
                        step: Step::Address,
                        missing: "building details are not loaded",
                    });
                }
                if self.state.options.is_none() {
                    self.refresh_options().await;
                }
                Ok(())
            }
            Step::Results => {
                if self.state.options.is_some() {
                    Ok(())
                } else {
                    Err(WizardError::NotReady {
                        step: Step::Options,
                        missing: "retrofit options are not ready",
                    })
                }
            }
            Step::Contractors => {
                if self.state.result.is_some() {
                    Ok(())
                } else {
                    Err(WizardError::NotReady {
                        step: Step::Results,
                        missing: "no break-even calculation yet",
                    })
                }
            }
        }
    }

    fn leave_to(
        &mut self,
        target: Step,
    ) {
        let from = self.state.step;
        self.state.clear_error(from);
        self.state.step = target;
        info!(from = from.number(), to = target.number(), "step changed");
    }
}
