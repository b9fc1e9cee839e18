//! Run summary - counts and status code distribution over a batch of outcomes

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::Outcome;

/// Aggregate counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total: u64,
    /// Outcomes with `ok`, including those carrying a warning
    pub passed: u64,
    pub failed: u64,
    /// Outcomes carrying a warning
    pub warned: u64,
    /// Transport failures (no status observed)
    pub errors: u64,
    /// Observed status code → count
    pub status_distribution: BTreeMap<u16, u64>,
    /// Sum of `timeMs`
    pub total_time_ms: u64,
}

impl RunSummary {
    /// Fraction of passed outcomes (0.0–1.0).
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64
        }
    }
}

/// Summarize a batch of outcomes.
#[must_use]
pub fn summarize(outcomes: &[Outcome]) -> RunSummary {
    let mut summary = RunSummary::default();
    for outcome in outcomes {
        summary.total += 1;
        if outcome.ok {
            summary.passed += 1;
        } else {
            summary.failed += 1;
        }
        if outcome.warning.is_some() {
            summary.warned += 1;
        }
        match outcome.status {
            Some(status) => *summary.status_distribution.entry(status).or_default() += 1,
            None => summary.errors += 1,
        }
        summary.total_time_ms += outcome.time_ms;
    }
    summary
}

/// Format a status distribution, e.g. `"200×3, 404×1"`.
#[must_use]
pub fn format_distribution(dist: &BTreeMap<u16, u64>) -> String {
    dist.iter()
        .map(|(code, count)| format!("{code}×{count}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `0.0` and `1.0` print without decimals, anything else with one.
#[must_use]
pub fn format_pct(rate: f64) -> String {
    let pct = rate * 100.0;
    if pct == 0.0 || pct == 100.0 {
        format!("{pct:.0}%")
    } else {
        format!("{pct:.1}%")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn outcome(ok: bool, status: Option<u16>, warning: bool, time_ms: u64) -> Outcome {
        Outcome {
            case_id: "c".into(),
            case_name: "c".into(),
            ok,
            status,
            status_text: None,
            time_ms,
            expected_status: None,
            warning: warning.then(|| "note".to_string()),
            error: status.is_none().then(|| "boom".to_string()),
            executed_at: Utc::now(),
        }
    }

    #[test]
    fn counts_each_category() {
        let summary = summarize(&[
            outcome(true, Some(200), false, 10),
            outcome(true, Some(200), true, 20),
            outcome(false, Some(500), false, 30),
            outcome(false, None, false, 40),
        ]);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.warned, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.total_time_ms, 100);
        assert_eq!(summary.status_distribution.get(&200), Some(&2));
        assert_eq!(summary.status_distribution.get(&500), Some(&1));
        assert!((summary.pass_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_batch() {
        let summary = summarize(&[]);
        assert_eq!(summary, RunSummary::default());
        assert_eq!(summary.pass_rate(), 0.0);
    }

    #[test]
    fn distribution_is_sorted() {
        let summary = summarize(&[
            outcome(false, Some(404), false, 1),
            outcome(true, Some(200), false, 1),
            outcome(true, Some(200), false, 1),
        ]);
        assert_eq!(
            format_distribution(&summary.status_distribution),
            "200×2, 404×1"
        );
    }

    #[test]
    fn format_pct_edge_cases() {
        assert_eq!(format_pct(0.0), "0%");
        assert_eq!(format_pct(1.0), "100%");
        assert_eq!(format_pct(0.5), "50.0%");
        assert_eq!(format_pct(1.0 / 3.0), "33.3%");
    }
}
