use std::fmt;

use rust_decimal::Decimal;
use rust_decimal::serde::float_option;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::warn;

use crate::input::{ParseNumberError, parse_optional_decimal, parse_optional_whole};
use crate::models::WindowTier;

pub const WINDOW_CHOICES: &[&str] = &["Single Pane", "Double Pane", "Triple Pane", "Mixed"];
pub const ROOF_CHOICES: &[&str] = &["Flat", "Hip", "Mansard", "Pitched"];
pub const HEATING_CHOICES: &[&str] = &[
    "District Heating",
    "Electric",
    "Gas Boiler",
    "Oil Boiler",
    "Heat Pump",
    "Mixed",
];
pub const FACADE_CHOICES: &[&str] = &[
    "Brick",
    "Concrete",
    "Mixed",
    "Prefab Panel",
    "Render",
    "Sandstone",
];
pub const INSULATION_CHOICES: &[&str] = &["Partial", "Full", "None"];

/// Building attributes as served by the backend.
///
/// Every field is optional because the source data is patchy. Unknown
/// keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Building {
    pub building_id: Option<String>,
    pub district: Option<String>,
    pub postal_code: Option<String>,
    pub address: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub city: Option<String>,

    pub building_type: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_whole")]
    pub construction_year: Option<i32>,
    #[serde(deserialize_with = "deserialize_optional_whole")]
    pub last_renovation_year: Option<i32>,
    pub total_area_m2: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_optional_whole")]
    pub num_units: Option<u32>,
    #[serde(deserialize_with = "deserialize_optional_whole")]
    pub num_floors: Option<u32>,

    pub window_type: Option<String>,
    #[serde(rename = "WindowToFloorRatio")]
    pub window_to_floor_ratio: Option<Decimal>,
    pub roof_type: Option<String>,
    pub facade_material: Option<String>,
    pub facade_sqm: Option<Decimal>,
    pub facade_sqm_suggestion: Option<Decimal>,
    pub insulation_walls: Option<String>,
    pub insulation_roof: Option<String>,
    pub insulation_basement: Option<String>,
    pub heating_system: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_whole")]
    pub heating_age: Option<i32>,

    pub epc_rating: Option<String>,
    pub energy_consumption_kwh_m2: Option<Decimal>,

    #[serde(rename = "RentPerUnit")]
    pub rent_per_unit: Option<Decimal>,
    #[serde(rename = "EnergyCostsPerMonth")]
    pub energy_costs_per_month: Option<Decimal>,
}

impl Building {
    pub fn window_tier(&self) -> Option<WindowTier> {
        self.window_type.as_deref().and_then(WindowTier::parse)
    }
}

/// Accepts `31`, `31.0`, `"31"` or null for integer columns.
///
/// Spreadsheet-backed sources turn integer columns with gaps into floats.
/// Anything that is not a whole number (`12.5`, `"n/a"`, negatives) is
/// dropped to `None` so one bad cell does not sink the whole record.
fn deserialize_optional_whole<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    let whole = match &value {
        None | Some(serde_json::Value::Null) => return Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Some(serde_json::Value::String(s)) => match parse_optional_whole::<i64>(s) {
            Ok(parsed) if s.trim().is_empty() => return Ok(parsed.and_then(|w| T::try_from(w).ok())),
            Ok(parsed) => parsed,
            Err(_) => None,
        },
        Some(_) => None,
    };

    match whole.and_then(|w| T::try_from(w).ok()) {
        Some(w) => Ok(Some(w)),
        None => {
            if let Some(raw) = value {
                warn!(%raw, "ignoring non-whole value in integer column");
            }
            Ok(None)
        }
    }
}

/// Attributes the user may override on the building form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuildingField {
    TotalAreaM2,
    NumUnits,
    RentPerUnit,
    EnergyCostsPerMonth,
    WindowType,
    WindowToFloorRatio,
    RoofType,
    FacadeMaterial,
    InsulationWalls,
    InsulationRoof,
    HeatingSystem,
    FacadeSqm,
    HeatingAge,
}

/// How a field's text input is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Decimal,
    Whole,
    Choice(&'static [&'static str]),
}

impl BuildingField {
    pub const ALL: [BuildingField; 13] = [
        Self::TotalAreaM2,
        Self::NumUnits,
        Self::RentPerUnit,
        Self::EnergyCostsPerMonth,
        Self::WindowType,
        Self::WindowToFloorRatio,
        Self::RoofType,
        Self::FacadeMaterial,
        Self::InsulationWalls,
        Self::InsulationRoof,
        Self::HeatingSystem,
        Self::FacadeSqm,
        Self::HeatingAge,
    ];

    /// Attribute name used on the wire.
    pub fn key(&self) -> &'static str {
        match self {
            Self::TotalAreaM2 => "total_area_m2",
            Self::NumUnits => "num_units",
            Self::RentPerUnit => "RentPerUnit",
            Self::EnergyCostsPerMonth => "EnergyCostsPerMonth",
            Self::WindowType => "window_type",
            Self::WindowToFloorRatio => "WindowToFloorRatio",
            Self::RoofType => "roof_type",
            Self::FacadeMaterial => "facade_material",
            Self::InsulationWalls => "insulation_walls",
            Self::InsulationRoof => "insulation_roof",
            Self::HeatingSystem => "heating_system",
            Self::FacadeSqm => "facade_sqm",
            Self::HeatingAge => "heating_age",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::TotalAreaM2 => "Building Square Meters (m2)",
            Self::NumUnits => "Number of residential units",
            Self::RentPerUnit => "Average monthly rent/unit (Euros)",
            Self::EnergyCostsPerMonth => "Energy Cost per month (Euros)",
            Self::WindowType => "Window Type",
            Self::WindowToFloorRatio => "Window to Floor Square Meters Ratio",
            Self::RoofType => "Roof Type",
            Self::FacadeMaterial => "Facade Type",
            Self::InsulationWalls => "Facade Insulation",
            Self::InsulationRoof => "Roof Insulation",
            Self::HeatingSystem => "Heating System Type",
            Self::FacadeSqm => "Facade Square Meters (m2)",
            Self::HeatingAge => "Heating Age",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::TotalAreaM2
            | Self::RentPerUnit
            | Self::EnergyCostsPerMonth
            | Self::WindowToFloorRatio
            | Self::FacadeSqm => FieldKind::Decimal,
            Self::NumUnits | Self::HeatingAge => FieldKind::Whole,
            Self::WindowType => FieldKind::Choice(WINDOW_CHOICES),
            Self::RoofType => FieldKind::Choice(ROOF_CHOICES),
            Self::FacadeMaterial => FieldKind::Choice(FACADE_CHOICES),
            Self::InsulationWalls | Self::InsulationRoof => FieldKind::Choice(INSULATION_CHOICES),
            Self::HeatingSystem => FieldKind::Choice(HEATING_CHOICES),
        }
    }

    /// Looks a field up by its wire key, case-insensitively.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for BuildingField {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("unknown building field '{0}'")]
    UnknownField(String),

    #[error("{field}: {source}")]
    InvalidNumber {
        field: BuildingField,
        #[source]
        source: ParseNumberError,
    },

    #[error("{field}: '{value}' is not one of {choices:?}")]
    UnknownChoice {
        field: BuildingField,
        value: String,
        choices: &'static [&'static str],
    },
}

/// Sparse set of user-entered values that shadow the building baseline.
///
/// Serializes to the override mapping the calculator accepts: unset
/// fields are omitted and amounts go out as JSON numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingOverrides {
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "float_option::serialize")]
    pub total_area_m2: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_units: Option<u32>,
    #[serde(
        rename = "RentPerUnit",
        skip_serializing_if = "Option::is_none",
        serialize_with = "float_option::serialize"
    )]
    pub rent_per_unit: Option<Decimal>,
    #[serde(
        rename = "EnergyCostsPerMonth",
        skip_serializing_if = "Option::is_none",
        serialize_with = "float_option::serialize"
    )]
    pub energy_costs_per_month: Option<Decimal>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_window_type"
    )]
    pub window_type: Option<String>,
    #[serde(
        rename = "WindowToFloorRatio",
        skip_serializing_if = "Option::is_none",
        serialize_with = "float_option::serialize"
    )]
    pub window_to_floor_ratio: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roof_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facade_material: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insulation_walls: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insulation_roof: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heating_system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "float_option::serialize")]
    pub facade_sqm: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heating_age: Option<i32>,
}

/// Recognised glazing tiers go out in the backend's spelling; anything
/// else ("Mixed") is passed through.
fn serialize_window_type<S>(
    value: &Option<String>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value.as_deref() {
        Some(raw) => match WindowTier::parse(raw) {
            Some(tier) => serializer.serialize_str(tier.wire_label()),
            None => serializer.serialize_str(raw),
        },
        None => serializer.serialize_none(),
    }
}

impl BuildingOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Parses `text` for `field` and stores it. Empty text clears the
    /// override. Returns whether the override set changed.
    pub fn set_text(
        &mut self,
        field: BuildingField,
        text: &str,
    ) -> Result<bool, FieldError> {
        let before = self.clone();
        let invalid = |source| FieldError::InvalidNumber { field, source };

        match field.kind() {
            FieldKind::Decimal => {
                let value = parse_optional_decimal(text).map_err(invalid)?;
                *self.decimal_slot(field) = value;
            }
            FieldKind::Whole => match field {
                BuildingField::NumUnits => {
                    self.num_units = parse_optional_whole(text).map_err(invalid)?;
                }
                _ => {
                    self.heating_age = parse_optional_whole(text).map_err(invalid)?;
                }
            },
            FieldKind::Choice(choices) => {
                let value = canonical_choice(field, choices, text)?;
                *self.text_slot(field) = value;
            }
        }

        Ok(before != *self)
    }

    /// Removes the override for `field`. Returns whether anything changed.
    pub fn clear(
        &mut self,
        field: BuildingField,
    ) -> bool {
        self.set_text(field, "").unwrap_or(false)
    }

    /// The overridden value for `field`, formatted for display.
    pub fn display_value(
        &self,
        field: BuildingField,
    ) -> Option<String> {
        match field {
            BuildingField::TotalAreaM2 => self.total_area_m2.map(|v| v.to_string()),
            BuildingField::NumUnits => self.num_units.map(|v| v.to_string()),
            BuildingField::RentPerUnit => self.rent_per_unit.map(|v| v.to_string()),
            BuildingField::EnergyCostsPerMonth => self.energy_costs_per_month.map(|v| v.to_string()),
            BuildingField::WindowType => self.window_type.clone(),
            BuildingField::WindowToFloorRatio => self.window_to_floor_ratio.map(|v| v.to_string()),
            BuildingField::RoofType => self.roof_type.clone(),
            BuildingField::FacadeMaterial => self.facade_material.clone(),
            BuildingField::InsulationWalls => self.insulation_walls.clone(),
            BuildingField::InsulationRoof => self.insulation_roof.clone(),
            BuildingField::HeatingSystem => self.heating_system.clone(),
            BuildingField::FacadeSqm => self.facade_sqm.map(|v| v.to_string()),
            BuildingField::HeatingAge => self.heating_age.map(|v| v.to_string()),
        }
    }

    fn decimal_slot(
        &mut self,
        field: BuildingField,
    ) -> &mut Option<Decimal> {
        match field {
            BuildingField::TotalAreaM2 => &mut self.total_area_m2,
            BuildingField::RentPerUnit => &mut self.rent_per_unit,
            BuildingField::EnergyCostsPerMonth => &mut self.energy_costs_per_month,
            BuildingField::WindowToFloorRatio => &mut self.window_to_floor_ratio,
            _ => &mut self.facade_sqm,
        }
    }

    fn text_slot(
        &mut self,
        field: BuildingField,
    ) -> &mut Option<String> {
        match field {
            BuildingField::WindowType => &mut self.window_type,
            BuildingField::RoofType => &mut self.roof_type,
            BuildingField::FacadeMaterial => &mut self.facade_material,
            BuildingField::InsulationWalls => &mut self.insulation_walls,
            BuildingField::InsulationRoof => &mut self.insulation_roof,
            _ => &mut self.heating_system,
        }
    }
}

fn canonical_choice(
    field: BuildingField,
    choices: &'static [&'static str],
    text: &str,
) -> Result<Option<String>, FieldError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    choices
        .iter()
        .find(|choice| choice.eq_ignore_ascii_case(trimmed))
        .map(|choice| Some(choice.to_string()))
        .ok_or_else(|| FieldError::UnknownChoice {
            field,
            value: trimmed.to_string(),
            choices,
        })
}

/// Read-only view of a baseline with the user's overrides layered on top.
///
/// Every downstream computation reads building attributes through this
/// view; the baseline itself is never written.
#[derive(Debug, Clone, Copy)]
pub struct EffectiveBuilding<'a> {
    baseline: &'a Building,
    overrides: &'a BuildingOverrides,
}

impl<'a> EffectiveBuilding<'a> {
    pub fn new(
        baseline: &'a Building,
        overrides: &'a BuildingOverrides,
    ) -> Self {
        Self {
            baseline,
            overrides,
        }
    }

    pub fn baseline(&self) -> &'a Building {
        self.baseline
    }

    pub fn overrides(&self) -> &'a BuildingOverrides {
        self.overrides
    }

    pub fn window_type(&self) -> Option<&'a str> {
        self.overrides
            .window_type
            .as_deref()
            .or(self.baseline.window_type.as_deref())
    }

    pub fn window_tier(&self) -> Option<WindowTier> {
        self.window_type().and_then(WindowTier::parse)
    }

    pub fn total_area_m2(&self) -> Option<Decimal> {
        self.overrides.total_area_m2.or(self.baseline.total_area_m2)
    }

    pub fn num_units(&self) -> Option<u32> {
        self.overrides.num_units.or(self.baseline.num_units)
    }

    pub fn rent_per_unit(&self) -> Option<Decimal> {
        self.overrides.rent_per_unit.or(self.baseline.rent_per_unit)
    }

    pub fn energy_costs_per_month(&self) -> Option<Decimal> {
        self.overrides
            .energy_costs_per_month
            .or(self.baseline.energy_costs_per_month)
    }

    /// Owned copy of the baseline with every override applied.
    pub fn merged(&self) -> Building {
        let o = self.overrides;
        let mut building = self.baseline.clone();

        building.total_area_m2 = o.total_area_m2.or(building.total_area_m2);
        building.num_units = o.num_units.or(building.num_units);
        building.rent_per_unit = o.rent_per_unit.or(building.rent_per_unit);
        building.energy_costs_per_month = o.energy_costs_per_month.or(building.energy_costs_per_month);
        building.window_type = o.window_type.clone().or(building.window_type);
        building.window_to_floor_ratio = o.window_to_floor_ratio.or(building.window_to_floor_ratio);
        building.roof_type = o.roof_type.clone().or(building.roof_type);
        building.facade_material = o.facade_material.clone().or(building.facade_material);
        building.insulation_walls = o.insulation_walls.clone().or(building.insulation_walls);
        building.insulation_roof = o.insulation_roof.clone().or(building.insulation_roof);
        building.heating_system = o.heating_system.clone().or(building.heating_system);
        building.facade_sqm = o.facade_sqm.or(building.facade_sqm);
        building.heating_age = o.heating_age.or(building.heating_age);

        building
    }
}
