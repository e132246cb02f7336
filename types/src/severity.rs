//! Ordered risk severity shared by the wellbeing and scam classifiers.

use serde::{Deserialize, Serialize};

/// Risk level on a total order: `None < Low < Moderate < High < Critical`.
///
/// The derived `Ord` follows variant declaration order, which is what makes
/// "overall risk is the max severity across detected concerns" a one-liner
/// at call sites.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    None,
    Low,
    Moderate,
    High,
    Critical,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// One step up the scale, saturating at `Critical`.
    #[must_use]
    pub const fn escalate(self) -> Self {
        match self {
            Severity::None => Severity::Low,
            Severity::Low => Severity::Moderate,
            Severity::Moderate => Severity::High,
            Severity::High | Severity::Critical => Severity::Critical,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
