use serde::{Deserialize, Deserializer};

use crate::models::{RetrofitCategory, RetrofitSubtype};

/// Tuning knobs for the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Postal codes shorter than this are not looked up.
    pub min_postal_code_len: usize,
    /// City appended to display addresses.
    pub default_city: String,
    /// Tag sent to the contractor directory.
    pub specialization: String,
    /// Subtype quoted when a building is first loaded.
    #[serde(deserialize_with = "deserialize_subtype")]
    pub baseline_subtype: RetrofitSubtype,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            min_postal_code_len: 3,
            default_city: "Berlin".to_string(),
            specialization: RetrofitCategory::Window.specialization().to_string(),
            baseline_subtype: RetrofitSubtype::TripleGlazing,
        }
    }
}

/// Accepts the wire tag as well as the short forms `"double"`/`"triple"`.
fn deserialize_subtype<'de, D>(deserializer: D) -> Result<RetrofitSubtype, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    RetrofitSubtype::parse(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unknown retrofit subtype '{raw}'")))
}
