//! Self-contained Allure-style HTML preview
//!
//! Inline CSS and JS only, so the file opens offline. Output depends on
//! nothing but the arguments: the one clock value is `meta.generated_at`.

use std::fmt::Write;

use crate::model::{Outcome, TestCase};
use crate::summary::summarize;
use crate::verdict::CaseStatus;

use super::escape::html;
use super::{case_for, display_name};

/// Caller-supplied header data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlMeta {
    pub title: String,
    /// Rendered verbatim (escaped) in the header
    pub generated_at: String,
}

impl Default for HtmlMeta {
    fn default() -> Self {
        Self {
            title: "API Test Report".to_string(),
            generated_at: String::new(),
        }
    }
}

const STYLE: &str = r#"
body{font-family:-apple-system,Segoe UI,Roboto,Helvetica,Arial,sans-serif;margin:0;background:#f4f5f7;color:#1f2328}
header{background:#2b2d42;color:#fff;padding:20px 32px}
header h1{margin:0 0 4px;font-size:22px}
header .meta{opacity:.75;font-size:13px}
main{padding:24px 32px}
.summary{display:flex;gap:12px;margin-bottom:20px}
.stat{background:#fff;border-radius:8px;padding:12px 18px;min-width:90px;box-shadow:0 1px 2px rgba(0,0,0,.08)}
.stat .n{font-size:24px;font-weight:600}
.stat.passed .n{color:#1a7f37}.stat.failed .n{color:#cf222e}.stat.warning .n{color:#9a6700}
.filters{margin-bottom:16px}
.filters button{border:1px solid #d0d7de;background:#fff;border-radius:16px;padding:5px 14px;margin-right:6px;cursor:pointer}
.filters button.active{background:#2b2d42;color:#fff;border-color:#2b2d42}
.card{background:#fff;border-radius:8px;padding:14px 18px;margin-bottom:10px;border-left:5px solid #1a7f37;box-shadow:0 1px 2px rgba(0,0,0,.08)}
.card.failed{border-left-color:#cf222e}.card.warning{border-left-color:#d4a72c}
.card h2{font-size:16px;margin:0 0 6px}
.card .row{font-size:13px;color:#57606a;display:flex;flex-wrap:wrap;gap:16px}
.method{font-weight:700;color:#0969da}
.callout{margin-top:8px;padding:8px 10px;border-radius:6px;font-size:13px;white-space:pre-wrap}
.callout.warn{background:#fff8c5}.callout.err{background:#ffebe9}
.empty{color:#57606a}
"#;

const SCRIPT: &str = r#"
(function(){
  var buttons=document.querySelectorAll('[data-filter]');
  buttons.forEach(function(btn){
    btn.addEventListener('click',function(){
      var f=btn.getAttribute('data-filter');
      document.querySelectorAll('.card').forEach(function(c){
        var show=f==='all'
          ||(f==='passed'&&c.getAttribute('data-ok')==='true')
          ||(f==='failed'&&c.getAttribute('data-ok')==='false')
          ||(f==='warning'&&c.getAttribute('data-warning')==='true');
        c.style.display=show?'':'none';
      });
      buttons.forEach(function(b){b.classList.toggle('active',b===btn);});
    });
  });
})();
"#;

/// `N ms` below one second, else seconds: no decimals from 10 s, two below.
///
/// Halves round up.
#[must_use]
pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        return format!("{ms} ms");
    }
    if ms >= 10_000 {
        return format!("{} s", (ms + 500) / 1000);
    }
    let centis = (ms + 5) / 10;
    format!("{}.{:02} s", centis / 100, centis % 100)
}

/// Render the HTML preview document.
#[must_use]
pub fn generate_allure_html(cases: &[TestCase], outcomes: &[Outcome], meta: &HtmlMeta) -> String {
    let summary = summarize(outcomes);
    let mut out = String::new();

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(out, "<title>{}</title>", html(&meta.title));
    let _ = writeln!(out, "<style>{STYLE}</style>\n</head>\n<body>");

    let _ = writeln!(
        out,
        "<header><h1>{}</h1><div class=\"meta\">Generated {}</div></header>",
        html(&meta.title),
        html(&meta.generated_at)
    );
    out.push_str("<main>\n<section class=\"summary\">\n");
    for (class, label, n) in [
        ("total", "Total", summary.total),
        ("passed", "Passed", summary.passed),
        ("failed", "Failed", summary.failed),
        ("warning", "Warned", summary.warned),
    ] {
        let _ = writeln!(
            out,
            "<div class=\"stat {class}\"><div class=\"n\">{n}</div><div>{label}</div></div>"
        );
    }
    out.push_str("</section>\n<nav class=\"filters\">\n");
    for (filter, label) in [
        ("all", "All"),
        ("passed", "Passed"),
        ("failed", "Failed"),
        ("warning", "Warning"),
    ] {
        let active = if filter == "all" { " class=\"active\"" } else { "" };
        let _ = writeln!(
            out,
            "<button type=\"button\" data-filter=\"{filter}\"{active}>{label}</button>"
        );
    }
    out.push_str("</nav>\n<section class=\"cards\">\n");

    if outcomes.is_empty() {
        out.push_str("<p class=\"empty\">No test cases were run.</p>\n");
    }
    for outcome in outcomes {
        render_card(&mut out, cases, outcome);
    }

    let _ = writeln!(out, "</section>\n</main>\n<script>{SCRIPT}</script>\n</body>\n</html>");
    out
}

fn render_card(out: &mut String, cases: &[TestCase], outcome: &Outcome) {
    let case = case_for(cases, outcome);
    let status = CaseStatus::of(outcome);
    let name = display_name(case, outcome);
    let method = case.map_or("?", |c| c.method.as_str());
    let expected = outcome
        .expected_status
        .map_or_else(|| "2xx".to_string(), |s| s.to_string());
    let actual = match (outcome.status, outcome.status_text.as_deref()) {
        (Some(code), Some(text)) if !text.is_empty() => format!("{code} {text}"),
        (Some(code), _) => code.to_string(),
        (None, _) => "error".to_string(),
    };

    let _ = writeln!(
        out,
        "<article class=\"card {status}\" data-ok=\"{}\" data-warning=\"{}\">",
        outcome.ok,
        outcome.warning.is_some()
    );
    let _ = writeln!(out, "<h2>{}</h2>", html(&name));
    let _ = writeln!(
        out,
        "<div class=\"row\"><span class=\"method\">{}</span><span>{}</span></div>",
        html(method),
        html(case.map_or("", |c| c.url.as_str()))
    );
    let _ = writeln!(
        out,
        "<div class=\"row\"><span>Expected: {}</span><span>Actual: {}</span><span>Duration: {}</span><span>Executed: {}</span></div>",
        html(&expected),
        html(&actual),
        format_duration(outcome.time_ms),
        outcome.executed_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(warning) = &outcome.warning {
        let _ = writeln!(out, "<div class=\"callout warn\">{}</div>", html(warning));
    }
    if let Some(error) = &outcome.error {
        let _ = writeln!(out, "<div class=\"callout err\">{}</div>", html(error));
    }
    out.push_str("</article>\n");
}
