//! The wizard state machine and the fetch orchestration behind it.

pub mod address;
pub mod building;
pub mod calculation;
pub mod config;
pub mod contractors;
pub mod controller;
pub mod health;
pub mod options;
pub mod sequence;
pub mod state;
pub mod step;

pub use address::{AddressResolver, BuildingsRequest, StreetsRequest};
pub use building::{BuildingDetail, BuildingDetailLoader, BuildingLoadRequest};
pub use calculation::CalculationRequest;
pub use config::WizardConfig;
pub use contractors::{ContractorsRequest, NO_CONTRACTORS_FOUND};
pub use controller::{WizardController, WizardError};
pub use health::HealthRequest;
pub use options::{OptionEnumerator, OptionsRequest};
pub use sequence::{Commit, RequestSequence, RequestTicket};
pub use state::{BackendStatus, WizardState};
pub use step::Step;
