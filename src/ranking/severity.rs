use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum SeverityLevel {
    Mild,
    Moderate,
    Severe,
    Critical,
}

impl SeverityLevel {
    /// Half-open buckets: `<2` mild, `[2,3)` moderate, `[3,4)` severe,
    /// `>=4` critical.
    pub fn from_score(score: f64) -> Self {
        if score < 2.0 {
            Self::Mild
        } else if score < 3.0 {
            Self::Moderate
        } else if score < 4.0 {
            Self::Severe
        } else {
            Self::Critical
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mild => "Mild",
            Self::Moderate => "Moderate",
            Self::Severe => "Severe",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
