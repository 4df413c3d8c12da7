use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopicParseError {
    #[error("unknown topic: {0}")]
    Unknown(String),
}

/// Exam content area a question is drawn from.
///
/// `Mixed` is the catch-all used by practice mode; it maps to every generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Mixed,
    Definitions,
    CalcTheory,
    Services,
    Feeders,
    Branch,
    Wiring,
    Equipment,
    Motors,
    Controls,
    Special,
    Renewable,
    Dwelling,
}

impl Topic {
    /// All topics in menu order.
    pub const ALL: [Topic; 13] = [
        Topic::Mixed,
        Topic::Definitions,
        Topic::CalcTheory,
        Topic::Services,
        Topic::Feeders,
        Topic::Branch,
        Topic::Wiring,
        Topic::Equipment,
        Topic::Motors,
        Topic::Controls,
        Topic::Special,
        Topic::Renewable,
        Topic::Dwelling,
    ];

    /// Stable identifier, also used on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::Mixed => "mixed",
            Topic::Definitions => "definitions",
            Topic::CalcTheory => "calc_theory",
            Topic::Services => "services",
            Topic::Feeders => "feeders",
            Topic::Branch => "branch",
            Topic::Wiring => "wiring",
            Topic::Equipment => "equipment",
            Topic::Motors => "motors",
            Topic::Controls => "controls",
            Topic::Special => "special",
            Topic::Renewable => "renewable",
            Topic::Dwelling => "dwelling",
        }
    }

    /// Human-readable label for menus.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Topic::Mixed => "Mixed",
            Topic::Definitions => "Definitions / Plans",
            Topic::CalcTheory => "Calculations & Theory",
            Topic::Services => "Services",
            Topic::Feeders => "Feeders",
            Topic::Branch => "Branch Circuits",
            Topic::Wiring => "Wiring Methods",
            Topic::Equipment => "Equipment & Devices",
            Topic::Motors => "Motors",
            Topic::Controls => "Controls / Disconnects",
            Topic::Special => "Special Occupancies",
            Topic::Renewable => "Renewable (PV)",
            Topic::Dwelling => "Dwelling Load",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = TopicParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Topic::ALL
            .into_iter()
            .find(|topic| topic.as_str() == needle)
            .ok_or_else(|| TopicParseError::Unknown(s.to_string()))
    }
}
