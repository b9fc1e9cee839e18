//! JUnit XML report

use std::fmt::Write;

use crate::model::{Outcome, TestCase};

use super::escape::xml;
use super::{case_for, display_name};

/// Render outcomes as a JUnit `testsuite`.
///
/// `tests` counts the test cases, `failures` counts outcomes with `ok == false`.
#[must_use]
pub fn generate_junit_report(cases: &[TestCase], outcomes: &[Outcome]) -> String {
    let failures = outcomes.iter().filter(|o| !o.ok).count();

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        out,
        "<testsuite name=\"API Tests\" tests=\"{}\" failures=\"{failures}\">",
        cases.len()
    );

    for outcome in outcomes {
        let name = display_name(case_for(cases, outcome), outcome);
        let time = outcome.time_ms as f64 / 1000.0;
        let _ = write!(
            out,
            "  <testcase classname=\"API\" name=\"{}\" time=\"{time}\">",
            xml(&name)
        );
        if !outcome.ok {
            let expected = outcome
                .expected_status
                .map_or_else(|| "2xx".to_string(), |s| s.to_string());
            let got = outcome
                .status
                .map_or_else(|| "error".to_string(), |s| s.to_string());
            let message = format!("Expected {expected}, got {got}");
            let body = outcome.error.as_deref().unwrap_or("Request failed");
            let _ = write!(
                out,
                "\n    <failure message=\"{}\">{}</failure>\n  ",
                xml(&message),
                xml(body)
            );
        }
        out.push_str("</testcase>\n");
    }

    out.push_str("</testsuite>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Method;
    use crate::report::fixtures::*;

    #[test]
    fn renders_suite() {
        let ok = case("1", "Health", Method::Get, "https://api.example.com/ok");
        let bad = case("2", "Create <user>", Method::Post, "https://api.example.com/users")
            .with_expected_status(Some(201));
        let down = case("3", "", Method::Delete, "https://api.example.com/users/1");
        let outcomes = vec![
            passed(&ok, 200, 120),
            failed(&bad, Some(500), None, 1500),
            failed(&down, None, Some("connect ECONNREFUSED & more"), 3000),
        ];

        let report = generate_junit_report(&[ok, bad, down], &outcomes);

        insta::assert_snapshot!(report, @r#"
<?xml version="1.0" encoding="UTF-8"?>
<testsuite name="API Tests" tests="3" failures="2">
  <testcase classname="API" name="Health" time="0.12"></testcase>
  <testcase classname="API" name="Create &lt;user&gt;" time="1.5">
    <failure message="Expected 201, got 500">Request failed</failure>
  </testcase>
  <testcase classname="API" name="DELETE https://api.example.com/users/1" time="3">
    <failure message="Expected 2xx, got error">connect ECONNREFUSED &amp; more</failure>
  </testcase>
</testsuite>
"#);
    }

    #[test]
    fn counts_are_independent() {
        let a = case("a", "A", Method::Get, "http://x/a");
        let b = case("b", "B", Method::Get, "http://x/b");
        let outcomes = vec![failed(&a, Some(404), None, 1)];

        let report = generate_junit_report(&[a, b], &outcomes);

        assert!(report.contains(r#"tests="2" failures="1""#));
        assert_eq!(report.matches("<testcase ").count(), 1);
    }

    #[test]
    fn empty_run() {
        let report = generate_junit_report(&[], &[]);
        assert!(report.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(report.contains(r#"tests="0" failures="0""#));
        assert!(report.ends_with("</testsuite>"));
    }
}
