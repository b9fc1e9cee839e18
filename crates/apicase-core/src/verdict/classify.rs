//! Pass/fail rule for a single response and the three-way case status

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::Outcome;

/// Whether an observed status satisfies the expectation.
///
/// With an expected status the match must be exact; without one any 2xx passes.
#[must_use]
pub fn is_pass(expected_status: Option<u16>, status: u16) -> bool {
    match expected_status {
        Some(expected) => status == expected,
        None => (200..300).contains(&status),
    }
}

/// Display classification of an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Passed,
    /// Passed, but with a non-fatal note
    Warning,
    Failed,
}

impl CaseStatus {
    #[must_use]
    pub fn of(outcome: &Outcome) -> Self {
        if !outcome.ok {
            Self::Failed
        } else if outcome.warning.is_some() {
            Self::Warning
        } else {
            Self::Passed
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Warning => "warning",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
