use core::str::FromStr;

use serde::{Deserialize, Serialize};

use banquet_core::DomainError;

/// Staff department.
///
/// The set is fixed: departments are not user-creatable and every staff user
/// belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Department {
    /// Sales and client relationship management.
    Commercial,
    /// Event organization and customer support.
    Support,
    /// Administration; the only escalation path for cross-ownership changes.
    Management,
}

impl Department {
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Commercial => "commercial",
            Department::Support => "support",
            Department::Management => "management",
        }
    }
}

impl core::fmt::Display for Department {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "commercial" => Ok(Department::Commercial),
            "support" => Ok(Department::Support),
            "management" => Ok(Department::Management),
            other => Err(DomainError::validation(format!(
                "unknown department '{other}'"
            ))),
        }
    }
}
