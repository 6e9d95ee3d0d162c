use std::fmt;

use serde::{Deserialize, Serialize};

/// A building candidate returned for a postal code and street.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingStub {
    pub building_id: String,
    pub display_address: String,
}

impl BuildingStub {
    /// House number, taken as the last word of the display address.
    pub fn house_number(&self) -> &str {
        self.display_address
            .split_whitespace()
            .last()
            .unwrap_or(&self.building_id)
    }
}

/// The address a user has narrowed down to.
///
/// Only a complete address (postal code, street and a resolved building)
/// counts as a selection; see [`Address::is_complete`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub postal_code: String,
    pub street: String,
    pub building: Option<BuildingStub>,
    pub city: String,
}

impl Address {
    pub fn is_complete(&self) -> bool {
        !self.postal_code.trim().is_empty()
            && !self.street.trim().is_empty()
            && self.building.is_some()
    }

    /// Identifier of the selected building, if the address is complete.
    pub fn building_id(&self) -> Option<&str> {
        if self.is_complete() {
            self.building.as_ref().map(|b| b.building_id.as_str())
        } else {
            None
        }
    }

    /// `"<display address>, <postal code> <city>"`, or an empty string
    /// while no building is selected.
    pub fn display_address(&self) -> String {
        match &self.building {
            Some(building) if self.is_complete() => {
                let locality = format!("{} {}", self.postal_code.trim(), self.city.trim());
                format!("{}, {}", building.display_address, locality.trim_end())
            }
            _ => String::new(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.display_address())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn stub() -> BuildingStub {
        BuildingStub {
            building_id: "B-1042".to_string(),
            display_address: "Weserstr. 12".to_string(),
        }
    }

    #[test]
    fn partial_address_has_no_building_id() {
        let address = Address {
            postal_code: "10317".to_string(),
            street: String::new(),
            building: Some(stub()),
            city: "Berlin".to_string(),
        };

        assert!(!address.is_complete());
        assert_eq!(address.building_id(), None);
        assert_eq!(address.display_address(), "");
    }

    #[test]
    fn complete_address_formats_locality() {
        let address = Address {
            postal_code: "10317".to_string(),
            street: "Weserstr.".to_string(),
            building: Some(stub()),
            city: "Berlin".to_string(),
        };

        assert_eq!(address.building_id(), Some("B-1042"));
        assert_eq!(address.to_string(), "Weserstr. 12, 10317 Berlin");
    }

    #[test]
    fn house_number_is_last_word() {
        assert_eq!(stub().house_number(), "12");
    }
}
