//! Presentation helpers for calculator output.
//!
//! The financial math runs in the calculator service; this module only
//! shapes its figures for display.

pub mod break_even;
pub mod common;

pub use break_even::BreakEven;
pub use common::{format_euro, format_percent, round_half_up};
