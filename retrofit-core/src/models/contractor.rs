use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Directory entry for a vetted contractor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contractor {
    pub contractor_id: Option<String>,
    pub company_name: Option<String>,
    pub specialization: Option<String>,
    pub district_served: Option<String>,
    pub avg_rating: Option<Decimal>,
    pub num_reviews: Option<Decimal>,
}

impl Contractor {
    pub fn display_name(&self) -> &str {
        self.company_name.as_deref().unwrap_or("—")
    }

    /// Availability line shown under the name.
    pub fn badge(&self) -> String {
        match self.specialization.as_deref() {
            Some(specialization) if !specialization.trim().is_empty() => {
                format!("{specialization} Available")
            }
            _ => "Available Immediately".to_string(),
        }
    }
}
