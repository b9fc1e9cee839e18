//! HTTP file generator - converts test cases to .http format

use crate::builder::{BuiltRequest, RequestBody, build_snapshot};
use crate::model::TestCase;

/// Generate .http file content from test cases
#[must_use]
pub fn to_http_file(cases: &[TestCase], mask_secrets: bool) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "# Auto-generated from apicase ({} test cases)",
        cases.len()
    ));
    lines.push(String::new());

    for (idx, case) in cases.iter().enumerate() {
        lines.push(format!("### [{idx}] {}", case.case_name));
        lines.push(format!("# ID: {}", case.id));
        if let Some(expected) = case.expected_status {
            lines.push(format!("# Expected status: {expected}"));
        }
        if let Some(last) = &case.last_run {
            let status = last
                .status
                .map_or_else(|| "error".to_string(), |s| s.to_string());
            lines.push(format!(
                "# Last run: {} ({status}, {} ms)",
                if last.ok { "passed" } else { "failed" },
                last.time_ms
            ));
        }
        lines.push(request_to_http(&build_snapshot(case, mask_secrets)));
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Generate a single request as .http format
#[must_use]
pub fn request_to_http(request: &BuiltRequest) -> String {
    let mut lines = Vec::new();

    lines.push(format!("{} {}", request.method, request.url));

    for (key, value) in &request.headers {
        lines.push(format!("{key}: {value}"));
    }

    if let RequestBody::Rendered(body) = &request.body {
        if request.form_encoded {
            lines.push("# multipart/form-data fields".to_string());
        } else if request.header("Content-Type").is_none()
            && serde_json::from_str::<serde_json::Value>(body).is_ok()
        {
            lines.push("Content-Type: application/json".to_string());
        }
        lines.push(String::new());
        lines.push(body.clone());
    }

    if let Some(warning) = &request.warning {
        lines.push(format!("# Warning: {warning}"));
    }

    lines.join("\n")
}
