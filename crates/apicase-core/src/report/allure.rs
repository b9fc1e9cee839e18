//! Allure2 result files and their `.tar.gz` packaging
//!
//! ```text
//! allure-results/
//! ├── executor.json
//! ├── 3f2a…-result.json
//! └── 9c41…-result.json
//! ```

use chrono::{DateTime, Utc};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};

use crate::model::{Outcome, TestCase};

use super::{ReportError, case_for, display_name};

/// Directory inside the archive holding every result file.
pub const RESULTS_DIR: &str = "allure-results";

/// HTTP client reported in the `framework` label.
pub const FRAMEWORK: &str = "reqwest";

/// Executor metadata written to `executor.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorInfo {
    /// Executor name (default `apicase`)
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub build_order: Option<u64>,
    /// Report name (default includes the generation timestamp)
    #[serde(default)]
    pub report_name: Option<String>,
    #[serde(default)]
    pub report_url: Option<String>,
    #[serde(default)]
    pub build_url: Option<String>,
}

/// Options for one archive.
#[derive(Debug, Clone)]
pub struct AllureOptions {
    pub executor: ExecutorInfo,
    /// Report generation time; result `stop` timestamps equal it
    pub generated_at: DateTime<Utc>,
}

/// One file of the results directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultFile {
    /// Path inside the archive, e.g. `allure-results/executor.json`
    pub path: String,
    pub contents: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Executor<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    build_order: Option<u64>,
    report_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    report_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    build_url: Option<&'a str>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AllureResult {
    uuid: String,
    history_id: String,
    name: String,
    full_name: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_details: Option<StatusDetails>,
    stage: String,
    start: i64,
    stop: i64,
    labels: Vec<NameValue>,
    parameters: Vec<NameValue>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StatusDetails {
    message: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct NameValue {
    name: String,
    value: String,
}

impl NameValue {
    fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
        }
    }
}

/// Produce `executor.json` and one `<uuid>-result.json` per outcome.
///
/// # Errors
///
/// Returns error if a document cannot be serialized.
pub fn allure_results(
    cases: &[TestCase],
    outcomes: &[Outcome],
    options: &AllureOptions,
) -> Result<Vec<ResultFile>, ReportError> {
    let generated_ms = options.generated_at.timestamp_millis();
    let mut files = Vec::with_capacity(outcomes.len() + 1);

    let executor = Executor {
        name: options.executor.name.as_deref().unwrap_or("apicase"),
        kind: "browser",
        build_order: options.executor.build_order,
        report_name: options.executor.report_name.clone().unwrap_or_else(|| {
            format!(
                "API Tests - {}",
                options.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
            )
        }),
        report_url: options.executor.report_url.as_deref(),
        build_url: options.executor.build_url.as_deref(),
    };
    files.push(ResultFile {
        path: format!("{RESULTS_DIR}/executor.json"),
        contents: to_json(&executor)?,
    });

    for outcome in outcomes {
        let case = case_for(cases, outcome);
        let uuid = uuid::Uuid::new_v4().to_string();

        let message = if outcome.ok {
            outcome.warning.clone()
        } else {
            outcome.error.clone()
        };

        let mut parameters = Vec::new();
        if let Some(c) = case {
            parameters.push(NameValue::new("method", c.method.as_str()));
            parameters.push(NameValue::new("url", c.url.clone()));
        }
        if let Some(expected) = outcome.expected_status {
            parameters.push(NameValue::new("expectedStatus", expected.to_string()));
        }

        let time_ms = i64::try_from(outcome.time_ms).unwrap_or(i64::MAX);
        let result = AllureResult {
            history_id: case
                .map(|c| c.id.clone())
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| uuid.clone()),
            uuid: uuid.clone(),
            name: display_name(case, outcome),
            full_name: case.map_or_else(|| outcome.case_id.clone(), TestCase::label),
            status: if outcome.ok { "passed" } else { "failed" }.to_string(),
            status_details: message.map(|message| StatusDetails { message }),
            stage: "finished".to_string(),
            start: generated_ms.saturating_sub(time_ms),
            stop: generated_ms,
            labels: vec![
                NameValue::new("suite", "API"),
                NameValue::new("framework", FRAMEWORK),
            ],
            parameters,
        };

        files.push(ResultFile {
            path: format!("{RESULTS_DIR}/{uuid}-result.json"),
            contents: to_json(&result)?,
        });
    }

    Ok(files)
}

/// Package result files into a gzip-compressed tar archive.
///
/// # Errors
///
/// Returns error if an entry cannot be appended or the stream cannot be finished.
pub fn package_archive(
    files: &[ResultFile],
    mtime: DateTime<Utc>,
) -> Result<Vec<u8>, ReportError> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut archive = tar::Builder::new(encoder);
    let mtime = u64::try_from(mtime.timestamp()).unwrap_or(0);

    for file in files {
        let data = file.contents.as_bytes();
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(mtime);
        archive
            .append_data(&mut header, &file.path, data)
            .map_err(|e| ReportError::Archive(format!("add {}: {e}", file.path)))?;
    }

    archive
        .into_inner()
        .map_err(|e| ReportError::Archive(format!("finish tar: {e}")))?
        .finish()
        .map_err(|e| ReportError::Archive(format!("finish gzip: {e}")))
}

/// Results plus packaging in one call.
///
/// # Errors
///
/// Returns error if serialization or packaging fails.
pub fn generate_allure_archive(
    cases: &[TestCase],
    outcomes: &[Outcome],
    options: &AllureOptions,
) -> Result<Vec<u8>, ReportError> {
    let files = allure_results(cases, outcomes, options)?;
    package_archive(&files, options.generated_at)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ReportError> {
    serde_json::to_string_pretty(value).map_err(|e| ReportError::Serialize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::model::Method;
    use crate::report::fixtures::*;

    fn options(executor: ExecutorInfo) -> AllureOptions {
        AllureOptions {
            executor,
            generated_at: at(),
        }
    }

    fn parse(file: &ResultFile) -> serde_json::Value {
        serde_json::from_str(&file.contents).unwrap()
    }

    #[test]
    fn executor_defaults_and_omissions() {
        let files = allure_results(&[], &[], &options(ExecutorInfo::default())).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "allure-results/executor.json");

        let executor = parse(&files[0]);
        assert_eq!(executor["name"], "apicase");
        assert_eq!(executor["type"], "browser");
        assert_eq!(executor["reportName"], "API Tests - 2026-03-01 12:00:00 UTC");
        assert!(executor.get("buildOrder").is_none());
        assert!(executor.get("reportUrl").is_none());
        assert!(executor.get("buildUrl").is_none());
    }

    #[test]
    fn executor_carries_configured_fields() {
        let info = ExecutorInfo {
            name: Some("nightly".into()),
            build_order: Some(42),
            report_name: Some("Smoke".into()),
            report_url: Some("https://ci/report".into()),
            build_url: Some("https://ci/build/42".into()),
        };
        let files = allure_results(&[], &[], &options(info)).unwrap();
        let executor = parse(&files[0]);
        assert_eq!(executor["buildOrder"], 42);
        assert_eq!(executor["reportName"], "Smoke");
        assert_eq!(executor["buildUrl"], "https://ci/build/42");
    }

    #[test]
    fn result_file_layout() {
        let ok = case("case-1", "Health", Method::Get, "https://x/health")
            .with_expected_status(Some(200));
        let mut warned = passed(&ok, 200, 250);
        warned.warning = Some("Raw body is not valid JSON; sending as text.".into());

        let files = allure_results(&[ok], &[warned], &options(ExecutorInfo::default())).unwrap();
        assert_eq!(files.len(), 2);

        let result = parse(&files[1]);
        let uuid = result["uuid"].as_str().unwrap();
        assert_eq!(files[1].path, format!("allure-results/{uuid}-result.json"));
        assert_eq!(result["historyId"], "case-1");
        assert_eq!(result["status"], "passed");
        assert_eq!(
            result["statusDetails"]["message"],
            "Raw body is not valid JSON; sending as text."
        );
        let stop = at().timestamp_millis();
        assert_eq!(result["stop"], stop);
        assert_eq!(result["start"], stop - 250);
        assert_eq!(
            result["labels"],
            serde_json::json!([
                {"name": "suite", "value": "API"},
                {"name": "framework", "value": "reqwest"}
            ])
        );
        assert_eq!(
            result["parameters"],
            serde_json::json!([
                {"name": "method", "value": "GET"},
                {"name": "url", "value": "https://x/health"},
                {"name": "expectedStatus", "value": "200"}
            ])
        );
    }

    #[test]
    fn failed_result_carries_error() {
        let down = case("", "Down", Method::Post, "https://x/down");
        let outcome = failed(&down, None, Some("timeout of 3000ms exceeded"), 3000);

        let files =
            allure_results(&[down], &[outcome], &options(ExecutorInfo::default())).unwrap();
        let result = parse(&files[1]);

        assert_eq!(result["status"], "failed");
        assert_eq!(result["statusDetails"]["message"], "timeout of 3000ms exceeded");
        assert_eq!(result["historyId"], result["uuid"]);
        assert_eq!(result["parameters"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn passing_result_without_warning_has_no_details() {
        let ok = case("c", "Ok", Method::Get, "https://x");
        let files = allure_results(
            &[ok.clone()],
            &[passed(&ok, 200, 1)],
            &options(ExecutorInfo::default()),
        )
        .unwrap();
        assert!(parse(&files[1]).get("statusDetails").is_none());
    }

    #[test]
    fn archive_contains_every_file() {
        let a = case("a", "A", Method::Get, "https://x/a");
        let b = case("b", "B", Method::Get, "https://x/b");
        let outcomes = vec![passed(&a, 200, 1), failed(&b, Some(500), None, 2)];

        let bytes =
            generate_allure_archive(&[a, b], &outcomes, &options(ExecutorInfo::default()))
                .unwrap();

        let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(bytes.as_slice()));
        let mut names = Vec::new();
        for entry in archive.entries().unwrap() {
            let mut entry = entry.unwrap();
            let name = entry.path().unwrap().to_string_lossy().into_owned();
            let mut contents = String::new();
            entry.read_to_string(&mut contents).unwrap();
            let _: serde_json::Value = serde_json::from_str(&contents).unwrap();
            names.push(name);
        }

        assert_eq!(names.len(), 3);
        assert_eq!(names[0], "allure-results/executor.json");
        assert!(names[1..]
            .iter()
            .all(|n| n.starts_with("allure-results/") && n.ends_with("-result.json")));
    }
}
