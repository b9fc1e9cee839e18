//! Report generators
//!
//! Pure functions from `(test cases, outcomes)` to external report formats:
//!
//! - [`junit`]: JUnit XML for CI dashboards
//! - [`allure`]: Allure2 result files, packaged as a `.tar.gz` archive
//! - [`html`]: self-contained Allure-style HTML preview
//!
//! The generators are independent of one another, so a failure in one never
//! prevents the others from producing output.

pub mod allure;
pub mod escape;
pub mod html;
pub mod junit;

pub use allure::{AllureOptions, ExecutorInfo, ResultFile, allure_results, generate_allure_archive};
pub use html::{HtmlMeta, format_duration, generate_allure_html};
pub use junit::generate_junit_report;

use crate::model::{Outcome, TestCase};

/// Display name used when nothing better is known.
pub const UNNAMED_CASE: &str = "Unnamed Case";

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Archive error: {0}")]
    Archive(String),
}

/// Find the test case an outcome belongs to.
pub(crate) fn case_for<'a>(cases: &'a [TestCase], outcome: &Outcome) -> Option<&'a TestCase> {
    cases.iter().find(|c| c.id == outcome.case_id)
}

/// Resolve a display name: case name → outcome name → `METHOD URL` → `Unnamed Case`.
pub(crate) fn display_name(case: Option<&TestCase>, outcome: &Outcome) -> String {
    if let Some(name) = case.map(|c| c.case_name.trim()).filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    if !outcome.case_name.trim().is_empty() {
        return outcome.case_name.trim().to_string();
    }
    match case {
        Some(c) if !c.url.is_empty() => c.label(),
        _ => UNNAMED_CASE.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};

    use crate::model::{Method, Outcome, TestCase};

    pub fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    pub fn case(id: &str, name: &str, method: Method, url: &str) -> TestCase {
        let mut case = TestCase::new(name, url).with_method(method);
        case.id = id.to_string();
        case
    }

    pub fn passed(case: &TestCase, status: u16, time_ms: u64) -> Outcome {
        Outcome {
            case_id: case.id.clone(),
            case_name: case.case_name.clone(),
            ok: true,
            status: Some(status),
            status_text: Some("OK".into()),
            time_ms,
            expected_status: case.expected_status,
            warning: None,
            error: None,
            executed_at: at(),
        }
    }

    pub fn failed(case: &TestCase, status: Option<u16>, error: Option<&str>, time_ms: u64) -> Outcome {
        Outcome {
            case_id: case.id.clone(),
            case_name: case.case_name.clone(),
            ok: false,
            status,
            status_text: status.map(|_| "Internal Server Error".to_string()),
            time_ms,
            expected_status: case.expected_status,
            warning: None,
            error: error.map(String::from),
            executed_at: at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::model::Method;

    #[test]
    fn name_priority() {
        let named = case("1", "Health", Method::Get, "http://x/health");
        let o = passed(&named, 200, 1);
        assert_eq!(display_name(Some(&named), &o), "Health");

        let unnamed = case("2", "", Method::Post, "http://x/users");
        let mut o = passed(&unnamed, 200, 1);
        o.case_name = "From outcome".into();
        assert_eq!(display_name(Some(&unnamed), &o), "From outcome");

        o.case_name.clear();
        assert_eq!(display_name(Some(&unnamed), &o), "POST http://x/users");
        assert_eq!(display_name(None, &o), UNNAMED_CASE);
    }
}
