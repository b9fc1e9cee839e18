//! Verdict policy - turns a batch of outcomes into a run verdict and exit code

use crate::model::Outcome;

use super::CaseStatus;

/// Policy for judging a run
#[derive(Debug, Clone)]
pub struct VerdictPolicy {
    /// Strict mode: warnings fail the run
    pub strict: bool,
}

impl Default for VerdictPolicy {
    fn default() -> Self {
        Self { strict: true }
    }
}

impl VerdictPolicy {
    /// Create a lenient policy (warnings don't fail)
    #[must_use]
    pub fn lenient() -> Self {
        Self { strict: false }
    }

    /// Exit code for a batch: 1 on any failure (or warning when strict), else 0.
    #[must_use]
    pub fn exit_code(&self, outcomes: &[Outcome]) -> i32 {
        let failed = outcomes.iter().any(|o| !o.ok);
        let warned = outcomes.iter().any(|o| o.warning.is_some());
        if failed || (self.strict && warned) {
            1
        } else {
            0
        }
    }

    /// Determine the verdict of a batch.
    ///
    /// PASS requires at least one outcome and no failures.
    #[must_use]
    pub fn verdict(&self, outcomes: &[Outcome]) -> Verdict {
        let exit_code = self.exit_code(outcomes);
        let count = |s: CaseStatus| outcomes.iter().filter(|o| CaseStatus::of(o) == s).count();
        let failed = count(CaseStatus::Failed);
        let warned = count(CaseStatus::Warning);
        let errors = outcomes.iter().filter(|o| o.error.is_some()).count();

        let status = if outcomes.is_empty() || exit_code != 0 {
            VerdictStatus::Fail
        } else {
            VerdictStatus::Pass
        };

        let reason = if outcomes.is_empty() {
            "No test cases were run".to_string()
        } else if failed == 0 && warned == 0 {
            format!("All {} test cases passed", outcomes.len())
        } else {
            let mut parts = Vec::new();
            if failed > 0 {
                parts.push(format!("{failed} of {} failed", outcomes.len()));
            }
            if errors > 0 {
                parts.push(format!("{errors} errors (connection/transport)"));
            }
            if warned > 0 {
                parts.push(format!("{warned} with warnings"));
            }
            parts.join("; ")
        };

        Verdict {
            status,
            exit_code,
            reason,
        }
    }
}

/// Final verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub exit_code: i32,
    pub reason: String,
}

/// Pass or fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictStatus {
    Pass,
    Fail,
}

impl std::fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}
