use std::fmt;

use serde::{Deserialize, Serialize};

/// Support tier attached to a line item.
///
/// Unknown tier names are kept verbatim so they round-trip, but they carry no
/// markup and rank below every known tier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SupportPlan {
    #[default]
    EightByFive,
    SixteenByFive,
    TwentyFourBySeven,
    Other(String),
}

impl SupportPlan {
    pub const KNOWN: [SupportPlan; 3] =
        [SupportPlan::EightByFive, SupportPlan::SixteenByFive, SupportPlan::TwentyFourBySeven];

    pub fn as_str(&self) -> &str {
        match self {
            Self::EightByFive => "8x5",
            Self::SixteenByFive => "16x5",
            Self::TwentyFourBySeven => "24x7",
            Self::Other(name) => name,
        }
    }

    /// Precedence used when picking the tier shown on a quote: 24x7 > 16x5 > 8x5.
    pub fn strength(&self) -> u8 {
        match self {
            Self::TwentyFourBySeven => 3,
            Self::SixteenByFive => 2,
            Self::EightByFive => 1,
            Self::Other(_) => 0,
        }
    }
}

impl From<String> for SupportPlan {
    fn from(value: String) -> Self {
        match value.trim() {
            "8x5" => Self::EightByFive,
            "16x5" => Self::SixteenByFive,
            "24x7" => Self::TwentyFourBySeven,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for SupportPlan {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<SupportPlan> for String {
    fn from(value: SupportPlan) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for SupportPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
