//! apicase-core: Test case model, request building and report generation
//!
//! Everything in this crate is free of network I/O. The runner crate turns a
//! [`BuiltRequest`] into an HTTP call; the report generators turn the
//! resulting outcomes into JUnit XML, Allure results and an HTML preview.

pub mod builder;
pub mod config;
pub mod generator;
pub mod model;
pub mod report;
pub mod schema;
pub mod store;
pub mod summary;
pub mod validate;
pub mod verdict;

pub use builder::{BuiltRequest, RequestBody, build_request, build_snapshot};
pub use config::{Config, ConfigError};
pub use generator::to_http_file;
pub use model::{
    ApiKeyLocation, Auth, AuthType, BodyType, KeyValue, LastRun, Method, Outcome, TestCase,
    attach_last_runs,
};
pub use report::{
    AllureOptions, ExecutorInfo, HtmlMeta, ReportError, generate_allure_archive,
    generate_allure_html, generate_junit_report,
};
pub use schema::StoreDocument;
pub use store::{CaseStore, JsonFileStore, MemoryStore, StoreError};
pub use summary::{RunSummary, summarize};
pub use validate::{Validation, ValidationStatus, validate_test_case};
pub use verdict::{CaseStatus, Verdict, VerdictPolicy, VerdictStatus, is_pass};
