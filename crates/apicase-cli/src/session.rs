//! Store-backed operations shared by the subcommands

use anyhow::{Result, bail};

use apicase_core::validate::{has_errors, to_terminal};
use apicase_core::{CaseStore, Outcome, TestCase, attach_last_runs, validate_test_case};
use apicase_runner::{Runner, Transport};

use crate::compose::{find_case, select_cases};

/// Validate and append a new test case.
///
/// # Errors
///
/// Returns error if the case has validation errors or the store fails.
pub fn add_case(store: &mut impl CaseStore, case: TestCase) -> Result<()> {
    ensure_valid(std::slice::from_ref(&case))?;
    let mut cases = store.load()?;
    cases.push(case);
    store.save(&cases)?;
    Ok(())
}

/// Remove a test case; returns what was removed.
///
/// # Errors
///
/// Returns error if the id does not resolve or the store fails.
pub fn remove_case(store: &mut impl CaseStore, id: &str) -> Result<TestCase> {
    let mut cases = store.load()?;
    let target = find_case(&cases, id)?.id.clone();
    let Some(idx) = cases.iter().position(|c| c.id == target) else {
        bail!("no test case with id '{id}'");
    };
    let removed = cases.remove(idx);
    store.save(&cases)?;
    Ok(removed)
}

/// Copy a test case and insert the copy right after the original.
///
/// # Errors
///
/// Returns error if the id does not resolve or the store fails.
pub fn duplicate_case(store: &mut impl CaseStore, id: &str) -> Result<TestCase> {
    let mut cases = store.load()?;
    let original = find_case(&cases, id)?;
    let copy = original.duplicate();
    let idx = cases
        .iter()
        .position(|c| c.id == original.id)
        .map_or(cases.len(), |i| i + 1);
    cases.insert(idx, copy.clone());
    store.save(&cases)?;
    Ok(copy)
}

/// Run the selected cases (all when `ids` is empty) in order.
///
/// Nothing is sent if a selected case has no URL. Other validation findings
/// are logged and the case runs anyway.
///
/// # Errors
///
/// Returns error on unknown ids, a case without a URL, or a store failure.
pub fn execute<T: Transport>(
    store: &impl CaseStore,
    runner: &Runner<T>,
    ids: &[String],
    on_outcome: impl FnMut(usize, &Outcome),
) -> Result<(Vec<TestCase>, Vec<Outcome>)> {
    let all = store.load()?;
    let selected = select_cases(&all, ids)?;
    if selected.is_empty() {
        bail!("no test cases to run");
    }
    for case in &selected {
        for finding in validate_test_case(case) {
            tracing::warn!(
                case = %case.id,
                field = %finding.field,
                status = %finding.status,
                "{}",
                finding.message
            );
        }
    }
    let outcomes = runner.run_batch_with(&selected, on_outcome)?;
    Ok((selected, outcomes))
}

/// Store each outcome as its case's `lastRun`.
///
/// The collection is re-read first so edits made during the run survive;
/// outcomes whose case has since been removed are dropped.
///
/// # Errors
///
/// Returns error if the store cannot be read or written.
pub fn record(store: &mut impl CaseStore, outcomes: &[Outcome]) -> Result<()> {
    let mut latest = store.load()?;
    attach_last_runs(&mut latest, outcomes);
    store.save(&latest)?;
    Ok(())
}

fn ensure_valid(cases: &[TestCase]) -> Result<()> {
    let mut report = Vec::new();
    for case in cases {
        let checks = validate_test_case(case);
        if has_errors(&checks) {
            report.push(format!("{}:\n{}", case.case_name, to_terminal(&checks)));
        }
    }
    if !report.is_empty() {
        bail!("invalid test cases\n{}", report.join("\n"));
    }
    Ok(())
}
