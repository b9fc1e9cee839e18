//! Test case execution: build, send, measure, judge

use std::time::Duration;

use apicase_core::{Outcome, TestCase, build_request, is_pass};

use crate::clock::{Clock, SystemClock};
use crate::transport::{HttpRequest, Transport};

/// Executes test cases one at a time over a [`Transport`].
pub struct Runner<T: Transport> {
    transport: T,
    clock: Box<dyn Clock>,
}

impl<T: Transport> Runner<T> {
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            clock: Box::new(SystemClock::default()),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Execute one test case with a single attempt.
    ///
    /// Any HTTP status, 4xx/5xx included, yields an outcome; so does a
    /// transport failure (`ok = false`, `error` set).
    ///
    /// # Errors
    ///
    /// Returns [`RunError::MissingUrl`] before any network I/O if the test
    /// case has no URL.
    pub fn run_test_case(&self, case: &TestCase) -> Result<Outcome, RunError> {
        check_precondition(case)?;
        Ok(self.execute(case))
    }

    /// Execute test cases sequentially, in order.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::MissingUrl`] for the first case without a URL;
    /// nothing is sent in that case.
    pub fn run_batch(&self, cases: &[TestCase]) -> Result<Vec<Outcome>, RunError> {
        self.run_batch_with(cases, |_, _| {})
    }

    /// Like [`run_batch`](Self::run_batch), reporting each outcome as it lands.
    ///
    /// # Errors
    ///
    /// Same as [`run_batch`](Self::run_batch).
    pub fn run_batch_with(
        &self,
        cases: &[TestCase],
        mut on_outcome: impl FnMut(usize, &Outcome),
    ) -> Result<Vec<Outcome>, RunError> {
        for case in cases {
            check_precondition(case)?;
        }

        let mut outcomes = Vec::with_capacity(cases.len());
        for (idx, case) in cases.iter().enumerate() {
            tracing::info!(
                index = idx + 1,
                total = cases.len(),
                case = %case.case_name,
                "running test case"
            );
            let outcome = self.execute(case);
            on_outcome(idx, &outcome);
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    fn execute(&self, case: &TestCase) -> Outcome {
        let built = build_request(case, self.transport.supports_multipart());
        let request = HttpRequest {
            method: built.method,
            url: built.url,
            headers: built.headers,
            body: built.body,
            timeout: timeout_for(case),
        };
        tracing::debug!(method = %request.method, url = %request.url, "sending request");

        let start = self.clock.monotonic_ms();
        let result = self.transport.send(&request);
        let time_ms = self.clock.monotonic_ms().saturating_sub(start);

        let mut outcome = Outcome {
            case_id: case.id.clone(),
            case_name: case.case_name.clone(),
            ok: false,
            status: None,
            status_text: None,
            time_ms,
            expected_status: case.expected_status,
            warning: built.warning,
            error: None,
            executed_at: self.clock.utc_now(),
        };

        match result {
            Ok(response) => {
                outcome.ok = is_pass(case.expected_status, response.status);
                outcome.status = Some(response.status);
                outcome.status_text = Some(response.status_text);
                tracing::debug!(status = response.status, time_ms, ok = outcome.ok, "response");
            }
            Err(err) => {
                tracing::warn!(case = %case.case_name, error = %err, time_ms, "request failed");
                if let Some(partial) = err.partial {
                    outcome.status = Some(partial.status);
                    outcome.status_text = Some(partial.status_text);
                }
                outcome.error = Some(err.message);
            }
        }
        outcome
    }
}

fn check_precondition(case: &TestCase) -> Result<(), RunError> {
    if case.url.trim().is_empty() {
        let case = if case.case_name.trim().is_empty() {
            case.id.clone()
        } else {
            case.case_name.clone()
        };
        return Err(RunError::MissingUrl { case });
    }
    Ok(())
}

/// Per-request timeout from `maxResponseTime` (seconds), when positive.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn timeout_for(case: &TestCase) -> Option<Duration> {
    case.max_response_time
        .filter(|s| s.is_finite() && *s > 0.0)
        .map(|s| Duration::from_millis((s * 1000.0).round() as u64))
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Test case '{case}' has no URL")]
    MissingUrl { case: String },
}
