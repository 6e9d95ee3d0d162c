use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{
    Address, Building, BuildingOverrides, BuildingStub, CalculatorResult, Contractor,
    EffectiveBuilding, RetrofitOption, RetrofitSubtype,
};
use crate::wizard::sequence::RequestSequence;
use crate::wizard::step::Step;

/// Result of the backend health check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BackendStatus {
    #[default]
    Pending,
    Ready,
    Error(String),
}

impl BackendStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// One sequence per dependent field.
#[derive(Debug, Clone, Default)]
pub(crate) struct Sequences {
    pub health: RequestSequence,
    pub streets: RequestSequence,
    pub buildings: RequestSequence,
    pub building: RequestSequence,
    pub options: RequestSequence,
    pub calculation: RequestSequence,
    pub contractors: RequestSequence,
}

impl Sequences {
    fn any_pending(&self) -> bool {
        [
            &self.health,
            &self.streets,
            &self.buildings,
            &self.building,
            &self.options,
            &self.calculation,
            &self.contractors,
        ]
        .iter()
        .any(|seq| seq.is_pending())
    }
}

/// Everything the wizard has accumulated so far.
///
/// Fields are written only by the wizard's components; callers read them
/// through the accessors.
#[derive(Debug, Clone, Default)]
pub struct WizardState {
    pub(crate) step: Step,
    pub(crate) address: Address,
    pub(crate) streets: Vec<String>,
    pub(crate) buildings: Vec<BuildingStub>,
    pub(crate) baseline: Option<Building>,
    pub(crate) baseline_result: Option<CalculatorResult>,
    pub(crate) loaded_building_id: Option<String>,
    pub(crate) overrides: BuildingOverrides,
    pub(crate) options: Option<Vec<RetrofitOption>>,
    pub(crate) selected_option: Option<RetrofitSubtype>,
    pub(crate) result: Option<CalculatorResult>,
    pub(crate) contractors: Vec<Contractor>,
    pub(crate) backend_status: BackendStatus,
    pub(crate) errors: BTreeMap<Step, String>,
    pub(crate) sequences: Sequences,
}

impl WizardState {
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            address: Address {
                city: city.into(),
                ..Address::default()
            },
            ..Self::default()
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn streets(&self) -> &[String] {
        &self.streets
    }

    pub fn buildings(&self) -> &[BuildingStub] {
        &self.buildings
    }

    /// Building attributes as served by the backend, before overrides.
    pub fn baseline(&self) -> Option<&Building> {
        self.baseline.as_ref()
    }

    /// Quote fetched together with the baseline.
    pub fn baseline_result(&self) -> Option<&CalculatorResult> {
        self.baseline_result.as_ref()
    }

    pub fn overrides(&self) -> &BuildingOverrides {
        &self.overrides
    }

    /// Baseline shadowed by the user's overrides.
    pub fn effective_building(&self) -> Option<EffectiveBuilding<'_>> {
        self.baseline
            .as_ref()
            .map(|baseline| EffectiveBuilding::new(baseline, &self.overrides))
    }

    /// `None` until the options for the current inputs have been derived.
    pub fn options(&self) -> Option<&[RetrofitOption]> {
        self.options.as_deref()
    }

    pub fn selected_option(&self) -> Option<&RetrofitOption> {
        let subtype = self.selected_option?;
        self.options
            .as_deref()?
            .iter()
            .find(|option| option.subtype == subtype)
    }

    pub fn selected_subtype(&self) -> Option<RetrofitSubtype> {
        self.selected_option
    }

    pub fn result(&self) -> Option<&CalculatorResult> {
        self.result.as_ref()
    }

    pub fn contractors(&self) -> &[Contractor] {
        &self.contractors
    }

    pub fn backend_status(&self) -> &BackendStatus {
        &self.backend_status
    }

    /// A remote request has been issued and not yet committed.
    pub fn is_loading(&self) -> bool {
        self.sequences.any_pending()
    }

    pub fn error(
        &self,
        step: Step,
    ) -> Option<&str> {
        self.errors.get(&step).map(String::as_str)
    }

    /// Error for the step currently shown.
    pub fn current_error(&self) -> Option<&str> {
        self.error(self.step)
    }

    pub(crate) fn set_error(
        &mut self,
        step: Step,
        message: impl Into<String>,
    ) {
        self.errors.insert(step, message.into());
    }

    pub(crate) fn clear_error(
        &mut self,
        step: Step,
    ) {
        self.errors.remove(&step);
    }

    /// Forgets everything derived from the selected building. Outstanding
    /// requests for those fields become stale.
    pub(crate) fn reset_building_dependents(&mut self) {
        self.baseline = None;
        self.baseline_result = None;
        self.loaded_building_id = None;
        self.overrides = BuildingOverrides::default();
        self.reset_option_dependents();
        self.options = None;
        self.contractors.clear();
        self.sequences.building.invalidate();
        self.sequences.options.invalidate();
        self.sequences.contractors.invalidate();
        for step in [Step::Options, Step::Results, Step::Contractors] {
            self.errors.remove(&step);
        }
    }

    /// Forgets the selected option and its calculation.
    pub(crate) fn reset_option_dependents(&mut self) {
        self.selected_option = None;
        self.discard_result();
    }

    /// Drops the calculation; any calculation in flight is stale. Steps
    /// past the options step need a result, so the wizard falls back there.
    pub(crate) fn discard_result(&mut self) {
        self.result = None;
        self.sequences.calculation.invalidate();
        if self.step > Step::Options {
            debug!(from = self.step.number(), "result discarded, back to options");
            self.step = Step::Options;
        }
    }
}
