pub mod backend;
pub mod calculations;
pub mod input;
pub mod models;
pub mod wizard;

pub use backend::{BackendConfig, BackendError, BackendFactory, BackendRegistry, RetrofitBackend};
pub use models::*;
pub use wizard::{BackendStatus, Step, WizardConfig, WizardController, WizardError, WizardState};
