//! Persistent run reports under `output_dir`
//!
//! Every `apicase run` is saved regardless of `--output` mode.
//! Directory layout: `{host_port}_{timestamp}/`
//!
//! Each artifact is written on its own; one failing never stops the rest.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use apicase_core::report::format_duration;
use apicase_core::{
    AllureOptions, Config, HtmlMeta, Outcome, RunSummary, TestCase, Verdict,
    generate_allure_archive, generate_allure_html, generate_junit_report, to_http_file,
};

pub const JUNIT_FILE: &str = "junit.xml";
pub const HTML_FILE: &str = "allure-report.html";
pub const ARCHIVE_FILE: &str = "allure-results.tar.gz";
pub const SUMMARY_FILE: &str = "summary.json";
pub const REPRODUCTIONS_FILE: &str = "reproductions.http";
pub const CONFIG_FILE: &str = "config.toml";

/// Everything needed to persist one run.
pub struct ReportData<'a> {
    pub config: &'a Config,
    pub cases: &'a [TestCase],
    pub outcomes: &'a [Outcome],
    pub summary: &'a RunSummary,
    pub verdict: &'a Verdict,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Result of [`save_report`].
#[derive(Debug, Default)]
pub struct SavedReport {
    pub dir: PathBuf,
    /// Files actually written
    pub written: Vec<PathBuf>,
    /// One message per artifact that could not be produced
    pub warnings: Vec<String>,
}

impl SavedReport {
    /// Path of the HTML preview, if it was written.
    #[must_use]
    pub fn html(&self) -> Option<&Path> {
        self.written
            .iter()
            .find(|p| p.ends_with(HTML_FILE))
            .map(PathBuf::as_path)
    }
}

/// Save a run to `{output_dir}/{host_port}_{timestamp}/`.
///
/// # Errors
///
/// Returns error only if the report directory itself cannot be created.
pub fn save_report(data: &ReportData) -> Result<SavedReport, std::io::Error> {
    let dir_name = build_dir_name(first_url(data.cases), data.finished_at);
    let report_dir = data.config.output_dir.join(dir_name);
    std::fs::create_dir_all(&report_dir)?;

    let mut saved = SavedReport {
        dir: report_dir.clone(),
        ..SavedReport::default()
    };
    let mut write = |name: &str, contents: Result<Vec<u8>, String>| {
        let path = report_dir.join(name);
        match contents.and_then(|bytes| std::fs::write(&path, bytes).map_err(|e| e.to_string())) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "report artifact written");
                saved.written.push(path);
            }
            Err(e) => {
                tracing::warn!(artifact = name, error = %e, "report artifact failed");
                saved.warnings.push(format!("{name}: {e}"));
            }
        }
    };

    write(
        JUNIT_FILE,
        Ok(generate_junit_report(data.cases, data.outcomes).into_bytes()),
    );

    let meta = HtmlMeta {
        title: data.config.report_title.clone(),
        generated_at: data.finished_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    };
    write(
        HTML_FILE,
        Ok(generate_allure_html(data.cases, data.outcomes, &meta).into_bytes()),
    );

    let options = AllureOptions {
        executor: data.config.executor.clone(),
        generated_at: data.finished_at,
    };
    write(
        ARCHIVE_FILE,
        generate_allure_archive(data.cases, data.outcomes, &options).map_err(|e| e.to_string()),
    );

    write(
        SUMMARY_FILE,
        serde_json::to_vec_pretty(&summary_json(data)).map_err(|e| e.to_string()),
    );

    write(
        CONFIG_FILE,
        toml::to_string_pretty(data.config)
            .map(String::into_bytes)
            .map_err(|e| e.to_string()),
    );

    // reproductions.http: failing cases only, secrets masked
    let failing: Vec<TestCase> = data
        .cases
        .iter()
        .filter(|c| data.outcomes.iter().any(|o| o.case_id == c.id && !o.ok))
        .cloned()
        .collect();
    if !failing.is_empty() {
        write(REPRODUCTIONS_FILE, Ok(to_http_file(&failing, true).into_bytes()));
    }

    Ok(saved)
}

fn summary_json(data: &ReportData) -> serde_json::Value {
    serde_json::json!({
        "verdict": {
            "status": data.verdict.status.to_string(),
            "exit_code": data.verdict.exit_code,
            "reason": data.verdict.reason,
        },
        "stats": data.summary,
        "meta": {
            "started_at": data.started_at.to_rfc3339(),
            "finished_at": data.finished_at.to_rfc3339(),
            "duration": format_duration(duration_ms(data.started_at, data.finished_at)),
            "store": data.config.store.display().to_string(),
        },
        "outcomes": data.outcomes,
    })
}

fn duration_ms(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    u64::try_from((end - start).num_milliseconds()).unwrap_or(0)
}

fn first_url(cases: &[TestCase]) -> &str {
    cases.first().map_or("", |c| c.url.as_str())
}

/// `{host_port}_{timestamp}` e.g. `localhost_8080_20260205T193000`
fn build_dir_name(url: &str, at: DateTime<Utc>) -> String {
    let host_port = extract_host_port(url);
    let ts = at.format("%Y%m%dT%H%M%S");
    format!("{host_port}_{ts}")
}

/// `"http://localhost:8080/path"` → `"localhost_8080"`
fn extract_host_port(url: &str) -> String {
    let host = url
        .split("://")
        .nth(1)
        .unwrap_or(url)
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .rsplit('@')
        .next()
        .unwrap_or_default()
        .replace(':', "_");
    if host.is_empty() {
        "unknown".to_string()
    } else {
        host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apicase_core::{VerdictPolicy, summarize};
    use chrono::TimeZone;

    #[test]
    fn extract_host_port_standard() {
        assert_eq!(extract_host_port("http://localhost:8080"), "localhost_8080");
        assert_eq!(
            extract_host_port("https://api.example.com"),
            "api.example.com"
        );
        assert_eq!(
            extract_host_port("http://10.0.0.1:3000/v1?x=1"),
            "10.0.0.1_3000"
        );
        assert_eq!(extract_host_port("https://user:pw@h.io/a"), "h.io");
        assert_eq!(extract_host_port(""), "unknown");
    }

    #[test]
    fn dir_name_format() {
        let at = Utc.with_ymd_and_hms(2026, 2, 5, 19, 30, 0).unwrap();
        assert_eq!(
            build_dir_name("http://localhost:8080/api", at),
            "localhost_8080_20260205T193000"
        );
    }

    fn outcome(case: &TestCase, ok: bool, status: u16, at: DateTime<Utc>) -> Outcome {
        Outcome {
            case_id: case.id.clone(),
            case_name: case.case_name.clone(),
            ok,
            status: Some(status),
            status_text: None,
            time_ms: 42,
            expected_status: case.expected_status,
            warning: None,
            error: None,
            executed_at: at,
        }
    }

    #[test]
    fn writes_every_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            output_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let at = Utc.with_ymd_and_hms(2026, 2, 5, 19, 30, 0).unwrap();
        let good = TestCase::new("good", "http://localhost:8080/ok");
        let bad = TestCase::new("bad", "http://localhost:8080/missing")
            .with_header("Authorization", "Bearer secret");
        let cases = vec![good.clone(), bad.clone()];
        let outcomes = vec![outcome(&good, true, 200, at), outcome(&bad, false, 404, at)];
        let summary = summarize(&outcomes);
        let verdict = VerdictPolicy::default().verdict(&outcomes);

        let saved = save_report(&ReportData {
            config: &config,
            cases: &cases,
            outcomes: &outcomes,
            summary: &summary,
            verdict: &verdict,
            started_at: at,
            finished_at: at,
        })
        .unwrap();

        assert!(saved.warnings.is_empty(), "{:?}", saved.warnings);
        assert_eq!(saved.dir, dir.path().join("localhost_8080_20260205T193000"));
        for name in [
            JUNIT_FILE,
            HTML_FILE,
            ARCHIVE_FILE,
            SUMMARY_FILE,
            CONFIG_FILE,
            REPRODUCTIONS_FILE,
        ] {
            assert!(saved.dir.join(name).is_file(), "{name} missing");
        }
        assert_eq!(saved.html(), Some(saved.dir.join(HTML_FILE).as_path()));

        let repro = std::fs::read_to_string(saved.dir.join(REPRODUCTIONS_FILE)).unwrap();
        assert!(repro.contains("GET http://localhost:8080/missing"));
        assert!(!repro.contains("/ok"));
        assert!(!repro.contains("secret"));

        let summary: serde_json::Value =
            serde_json::from_slice(&std::fs::read(saved.dir.join(SUMMARY_FILE)).unwrap()).unwrap();
        assert_eq!(summary["verdict"]["status"], "FAIL");
        assert_eq!(summary["stats"]["failed"], 1);
    }

    #[test]
    fn no_reproductions_when_all_pass() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            output_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let at = Utc.with_ymd_and_hms(2026, 2, 5, 19, 30, 0).unwrap();
        let case = TestCase::new("good", "http://localhost/ok");
        let outcomes = vec![outcome(&case, true, 200, at)];
        let summary = summarize(&outcomes);
        let verdict = VerdictPolicy::default().verdict(&outcomes);

        let saved = save_report(&ReportData {
            config: &config,
            cases: std::slice::from_ref(&case),
            outcomes: &outcomes,
            summary: &summary,
            verdict: &verdict,
            started_at: at,
            finished_at: at,
        })
        .unwrap();

        assert!(!saved.dir.join(REPRODUCTIONS_FILE).exists());
        assert_eq!(saved.written.len(), 5);
    }
}
