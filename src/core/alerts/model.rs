// Alert model types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::geo::Coordinate;

/// Alert severity as reported by the alert source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Only High alerts are urgent enough to notify
    pub fn is_urgent(self) -> bool {
        self == Self::High
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// A disaster alert affecting everything within `radius_km` of `location`.
/// Two alerts with identical fields are indistinguishable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub kind: String,
    pub severity: Severity,
    pub location: Coordinate,
    /// Always > 0
    pub radius_km: f64,
}

impl AlertRecord {
    pub fn new(
        kind: impl Into<String>,
        severity: Severity,
        location: impl Into<Coordinate>,
        radius_km: f64,
    ) -> Self {
        Self {
            kind: kind.into(),
            severity,
            location: location.into(),
            radius_km,
        }
    }
}
