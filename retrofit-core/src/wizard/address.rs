use tracing::{debug, warn};

use crate::backend::{BackendError, RetrofitBackend};
use crate::models::BuildingStub;
use crate::wizard::sequence::{Commit, RequestTicket};
use crate::wizard::state::WizardState;
use crate::wizard::step::Step;

/// Street lookup for one postal code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetsRequest {
    pub ticket: RequestTicket,
    pub postal_code: String,
}

impl StreetsRequest {
    pub async fn fetch(
        &self,
        backend: &dyn RetrofitBackend,
    ) -> Result<Vec<String>, BackendError> {
        backend.list_streets(&self.postal_code).await
    }
}

/// Building lookup for one postal code and street.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingsRequest {
    pub ticket: RequestTicket,
    pub postal_code: String,
    pub street: String,
}

impl BuildingsRequest {
    pub async fn fetch(
        &self,
        backend: &dyn RetrofitBackend,
    ) -> Result<Vec<BuildingStub>, BackendError> {
        backend.list_buildings(&self.postal_code, &self.street).await
    }
}

/// Narrows postal code and street input down to a single building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressResolver {
    min_postal_code_len: usize,
}

impl AddressResolver {
    pub fn new(min_postal_code_len: usize) -> Self {
        Self {
            min_postal_code_len,
        }
    }

    fn postal_code_is_searchable(
        &self,
        postal_code: &str,
    ) -> bool {
        postal_code.trim().chars().count() >= self.min_postal_code_len
    }

    /// Stores the postal code and, when it is long enough, issues a street
    /// lookup. Street and building input depend on the postal code and are
    /// cleared when it changes.
    pub fn set_postal_code(
        &self,
        state: &mut WizardState,
        postal_code: &str,
    ) -> Option<StreetsRequest> {
        let postal_code = postal_code.trim();
        if state.address.postal_code != postal_code {
            state.address.postal_code = postal_code.to_string();
            state.address.street.clear();
            state.streets.clear();
            Self::clear_buildings(state);
        }

        if !self.postal_code_is_searchable(postal_code) {
            debug!(postal_code, "postal code too short, skipping street lookup");
            state.sequences.streets.invalidate();
            return None;
        }

        let ticket = state.sequences.streets.issue();
        debug!(postal_code, ticket = ticket.value(), "issuing street lookup");
        Some(StreetsRequest {
            ticket,
            postal_code: postal_code.to_string(),
        })
    }

    pub fn commit_streets(
        &self,
        state: &mut WizardState,
        request: &StreetsRequest,
        outcome: Result<Vec<String>, BackendError>,
    ) -> Commit {
        if !state.sequences.streets.settle(request.ticket) {
            warn!(
                postal_code = %request.postal_code,
                ticket = request.ticket.value(),
                "discarding stale street lookup"
            );
            return Commit::Stale;
        }

        match outcome {
            Ok(streets) => {
                debug!(postal_code = %request.postal_code, count = streets.len(), "streets loaded");
                state.streets = streets;
                state.clear_error(Step::Address);
                Commit::Applied
            }
            Err(e) => {
                warn!(postal_code = %request.postal_code, "street lookup failed: {}", e);
                state.streets.clear();
                Self::clear_buildings(state);
                state.set_error(Step::Address, e.user_message());
                Commit::Failed
            }
        }
    }

    /// Stores the street and issues a building lookup when both postal
    /// code and street are usable.
    pub fn set_street(
        &self,
        state: &mut WizardState,
        street: &str,
    ) -> Option<BuildingsRequest> {
        let street = street.trim();
        if state.address.street != street {
            state.address.street = street.to_string();
            Self::clear_buildings(state);
        }

        let postal_code = state.address.postal_code.clone();
        if street.is_empty() || !self.postal_code_is_searchable(&postal_code) {
            debug!(postal_code = %postal_code, street, "address incomplete, skipping building lookup");
            state.sequences.buildings.invalidate();
            return None;
        }

        let ticket = state.sequences.buildings.issue();
        debug!(postal_code = %postal_code, street, ticket = ticket.value(), "issuing building lookup");
        Some(BuildingsRequest {
            ticket,
            postal_code,
            street: street.to_string(),
        })
    }

    /// Applies a building lookup. A single candidate is selected
    /// automatically; otherwise the user has to pick one.
    pub fn commit_buildings(
        &self,
        state: &mut WizardState,
        request: &BuildingsRequest,
        outcome: Result<Vec<BuildingStub>, BackendError>,
    ) -> Commit {
        if !state.sequences.buildings.settle(request.ticket) {
            warn!(
                street = %request.street,
                ticket = request.ticket.value(),
                "discarding stale building lookup"
            );
            return Commit::Stale;
        }

        match outcome {
            Ok(buildings) => {
                debug!(street = %request.street, count = buildings.len(), "buildings loaded");
                let auto_selected = match buildings.as_slice() {
                    [only] => Some(only.clone()),
                    _ => None,
                };
                state.buildings = buildings;
                Self::apply_selection(state, auto_selected);
                state.clear_error(Step::Address);
                Commit::Applied
            }
            Err(e) => {
                warn!(street = %request.street, "building lookup failed: {}", e);
                Self::clear_buildings(state);
                state.set_error(Step::Address, e.user_message());
                Commit::Failed
            }
        }
    }

    /// Picks one of the listed candidates. Returns `false` when the id is
    /// not among them.
    pub fn select_building(
        &self,
        state: &mut WizardState,
        building_id: &str,
    ) -> bool {
        let Some(stub) = state
            .buildings
            .iter()
            .find(|stub| stub.building_id == building_id)
            .cloned()
        else {
            return false;
        };
        Self::apply_selection(state, Some(stub));
        true
    }

    fn clear_buildings(state: &mut WizardState) {
        state.buildings.clear();
        state.sequences.buildings.invalidate();
        Self::apply_selection(state, None);
    }

    /// Replaces the selected building. A different selection invalidates
    /// everything loaded for the previous one.
    fn apply_selection(
        state: &mut WizardState,
        selection: Option<BuildingStub>,
    ) {
        if state.address.building == selection {
            return;
        }
        debug!(
            building_id = ?selection.as_ref().map(|s| s.building_id.as_str()),
            "building selection changed"
        );
        state.address.building = selection;
        state.reset_building_dependents();
        if state.step > Step::Address {
            state.step = Step::Address;
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn stub(
        id: &str,
        display: &str,
    ) -> BuildingStub {
        BuildingStub {
            building_id: id.to_string(),
            display_address: display.to_string(),
        }
    }

    fn resolver() -> AddressResolver {
        AddressResolver::new(3)
    }

    #[test]
    fn short_postal_code_issues_no_request() {
        let mut state = WizardState::new("Berlin");

        assert_eq!(resolver().set_postal_code(&mut state, "10"), None);
        assert_eq!(state.address().postal_code, "10");
        assert!(!state.is_loading());
    }

    #[test]
    fn postal_code_at_minimum_length_is_looked_up() {
        let mut state = WizardState::new("Berlin");

        let request = resolver().set_postal_code(&mut state, " 103 ").unwrap();

        assert_eq!(request.postal_code, "103");
        assert!(state.is_loading());
    }

    #[test]
    fn newer_street_lookup_wins_regardless_of_arrival_order() {
        let resolver = resolver();
        let mut state = WizardState::new("Berlin");
        let first = resolver.set_postal_code(&mut state, "10317").unwrap();
        let second = resolver.set_postal_code(&mut state, "10318").unwrap();

        let applied = resolver.commit_streets(&mut state, &second, Ok(vec!["Weserstr.".to_string()]));
        let stale = resolver.commit_streets(&mut state, &first, Ok(vec!["Old Street".to_string()]));

        assert_eq!(applied, Commit::Applied);
        assert_eq!(stale, Commit::Stale);
        assert_eq!(state.streets(), ["Weserstr.".to_string()]);
    }

    #[test]
    fn failed_street_lookup_clears_lists_and_sets_address_error() {
        let resolver = resolver();
        let mut state = WizardState::new("Berlin");
        state.streets = vec!["Old Street".to_string()];
        let request = resolver.set_postal_code(&mut state, "10317").unwrap();

        let commit = resolver.commit_streets(
            &mut state,
            &request,
            Err(BackendError::Status {
                status: 404,
                body: "Unknown postal code".to_string(),
            }),
        );

        assert_eq!(commit, Commit::Failed);
        assert!(state.streets().is_empty());
        assert_eq!(state.error(Step::Address), Some("Unknown postal code"));
    }

    #[test]
    fn single_building_is_auto_selected() {
        let resolver = resolver();
        let mut state = WizardState::new("Berlin");
        resolver.set_postal_code(&mut state, "10317");
        let request = resolver.set_street(&mut state, "Weserstr.").unwrap();

        resolver.commit_buildings(&mut state, &request, Ok(vec![stub("B-12", "Weserstr. 12")]));

        assert!(state.address().is_complete());
        assert_eq!(state.address().building_id(), Some("B-12"));
    }

    #[test]
    fn several_buildings_leave_selection_unset() {
        let resolver = resolver();
        let mut state = WizardState::new("Berlin");
        resolver.set_postal_code(&mut state, "10317");
        let request = resolver.set_street(&mut state, "Weserstr.").unwrap();

        resolver.commit_buildings(
            &mut state,
            &request,
            Ok(vec![stub("B-12", "Weserstr. 12"), stub("B-14", "Weserstr. 14")]),
        );

        assert_eq!(state.buildings().len(), 2);
        assert_eq!(state.address().building_id(), None);

        assert!(resolver.select_building(&mut state, "B-14"));
        assert_eq!(state.address().building_id(), Some("B-14"));
    }

    #[test]
    fn empty_building_list_leaves_selection_unset() {
        let resolver = resolver();
        let mut state = WizardState::new("Berlin");
        resolver.set_postal_code(&mut state, "10317");
        let request = resolver.set_street(&mut state, "Weserstr.").unwrap();

        resolver.commit_buildings(&mut state, &request, Ok(Vec::new()));

        assert_eq!(state.address().building_id(), None);
    }

    #[test]
    fn selecting_unlisted_building_is_refused() {
        let mut state = WizardState::new("Berlin");

        assert!(!resolver().select_building(&mut state, "B-99"));
    }

    #[test]
    fn street_without_postal_code_issues_no_request() {
        let mut state = WizardState::new("Berlin");

        assert_eq!(resolver().set_street(&mut state, "Weserstr."), None);
    }

    #[test]
    fn changing_postal_code_clears_street_and_selection() {
        let resolver = resolver();
        let mut state = WizardState::new("Berlin");
        resolver.set_postal_code(&mut state, "10317");
        let request = resolver.set_street(&mut state, "Weserstr.").unwrap();
        resolver.commit_buildings(&mut state, &request, Ok(vec![stub("B-12", "Weserstr. 12")]));

        resolver.set_postal_code(&mut state, "12043");

        assert_eq!(state.address().street, "");
        assert!(state.buildings().is_empty());
        assert_eq!(state.address().building_id(), None);
    }
}
