use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static SINGLE_PANE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)single").expect("Invalid single pane regex"));
static DOUBLE_PANE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)double").expect("Invalid double pane regex"));
static TRIPLE_PANE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)triple").expect("Invalid triple pane regex"));

/// Glazing tier of a building's windows.
///
/// Building data spells the same tier several ways ("Single-pane",
/// "Single Pane", "single glazing"), so tiers are recognised by keyword.
/// Values such as "Mixed" have no tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WindowTier {
    Single,
    Double,
    Triple,
}

impl WindowTier {
    /// Matches `single`, `double` and `triple` case-insensitively, in that
    /// order of precedence.
    pub fn parse(s: &str) -> Option<Self> {
        if SINGLE_PANE.is_match(s) {
            Some(Self::Single)
        } else if DOUBLE_PANE.is_match(s) {
            Some(Self::Double)
        } else if TRIPLE_PANE.is_match(s) {
            Some(Self::Triple)
        } else {
            None
        }
    }

    /// Label shown in the building form.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Single => "Single Pane",
            Self::Double => "Double Pane",
            Self::Triple => "Triple Pane",
        }
    }

    /// Spelling the calculator backend expects in an override set.
    pub fn wire_label(&self) -> &'static str {
        match self {
            Self::Single => "Single-pane",
            Self::Double => "Double-pane",
            Self::Triple => "Triple-pane",
        }
    }

    /// Upgrades worth quoting for a building currently at `tier`.
    ///
    /// Only strictly better glazing is offered; a triple-pane or
    /// unrecognised window gets nothing.
    pub fn upgrades(tier: Option<WindowTier>) -> &'static [RetrofitSubtype] {
        match tier {
            Some(Self::Single) => &[RetrofitSubtype::DoubleGlazing, RetrofitSubtype::TripleGlazing],
            Some(Self::Double) => &[RetrofitSubtype::TripleGlazing],
            Some(Self::Triple) | None => &[],
        }
    }
}

impl fmt::Display for WindowTier {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Broad retrofit category. Drives which contractors are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RetrofitCategory {
    #[default]
    Window,
}

impl RetrofitCategory {
    /// Specialization tag understood by the contractor directory.
    pub fn specialization(&self) -> &'static str {
        match self {
            Self::Window => "window",
        }
    }
}

/// A concrete upgrade the calculator can quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RetrofitSubtype {
    #[serde(rename = "Window replacement - double glazing")]
    DoubleGlazing,
    #[serde(rename = "Window replacement - triple glazing")]
    TripleGlazing,
}

impl RetrofitSubtype {
    pub const ALL: [RetrofitSubtype; 2] = [Self::DoubleGlazing, Self::TripleGlazing];

    /// Wire tag sent as `sub_type_of_retrofit`.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::DoubleGlazing => "Window replacement - double glazing",
            Self::TripleGlazing => "Window replacement - triple glazing",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::DoubleGlazing => "Double glazing",
            Self::TripleGlazing => "Triple glazing",
        }
    }

    pub fn category(&self) -> RetrofitCategory {
        RetrofitCategory::Window
    }

    /// Accepts the wire tag or the short forms `double` / `triple`.
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        Self::ALL.into_iter().find(|subtype| {
            subtype.tag().eq_ignore_ascii_case(trimmed)
                || subtype.label().eq_ignore_ascii_case(trimmed)
                || match subtype {
                    Self::DoubleGlazing => trimmed.eq_ignore_ascii_case("double"),
                    Self::TripleGlazing => trimmed.eq_ignore_ascii_case("triple"),
                }
        })
    }
}

impl fmt::Display for RetrofitSubtype {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.tag())
    }
}
