use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Building, BuildingStub, CalculatorRequest, CalculatorResult, Contractor};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The service answered with a non-success status. `body` is the
    /// response text and is what the user gets to see.
    #[error("{body}")]
    Status { status: u16, body: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl BackendError {
    /// Text for the step-scoped error slot.
    ///
    /// A status error with an empty body still needs something readable.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { status, body } if body.trim().is_empty() => {
                format!("Request failed with status {status}")
            }
            other => other.to_string(),
        }
    }
}

/// The remote collaborators of the wizard: address lookup, building data,
/// calculator and contractor directory.
#[async_trait]
pub trait RetrofitBackend: Send + Sync {
    // Service availability
    async fn health(&self) -> Result<(), BackendError>;

    // Address lookup
    async fn list_streets(&self, postal_code: &str) -> Result<Vec<String>, BackendError>;

    async fn list_buildings(
        &self,
        postal_code: &str,
        street: &str,
    ) -> Result<Vec<BuildingStub>, BackendError>;

    // Building data
    async fn get_building(&self, building_id: &str) -> Result<Building, BackendError>;

    // Calculator
    async fn run_calculator(
        &self,
        request: &CalculatorRequest,
    ) -> Result<CalculatorResult, BackendError>;

    // Contractor directory
    async fn list_contractors(
        &self,
        specialization: &str,
    ) -> Result<Vec<Contractor>, BackendError>;
}
