use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// SprintStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a sprint directory.
///
/// Derived from which documents exist; never stored. `Review` is part of the
/// vocabulary but no file layout currently produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SprintStatus {
    Proposed,
    Active,
    Review,
    Completed,
}

impl SprintStatus {
    pub fn all() -> &'static [SprintStatus] {
        &[
            SprintStatus::Proposed,
            SprintStatus::Active,
            SprintStatus::Review,
            SprintStatus::Completed,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SprintStatus::Proposed => "proposed",
            SprintStatus::Active => "active",
            SprintStatus::Review => "review",
            SprintStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for SprintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SprintStatus {
    type Err = crate::error::StrideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "proposed" => Ok(SprintStatus::Proposed),
            "active" => Ok(SprintStatus::Active),
            "review" => Ok(SprintStatus::Review),
            "completed" => Ok(SprintStatus::Completed),
            _ => Err(crate::error::StrideError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
