mod address;
mod building;
mod calculator_result;
mod contractor;
mod retrofit_option;
mod window;

pub use address::{Address, BuildingStub};
pub use building::{
    Building, BuildingField, BuildingOverrides, EffectiveBuilding, FACADE_CHOICES, FieldError,
    FieldKind, HEATING_CHOICES, INSULATION_CHOICES, ROOF_CHOICES, WINDOW_CHOICES,
};
pub use calculator_result::{CalculatorRequest, CalculatorResult};
pub use contractor::Contractor;
pub use retrofit_option::{OptionQuote, RetrofitOption};
pub use window::{RetrofitCategory, RetrofitSubtype, WindowTier};
