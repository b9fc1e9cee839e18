//! Verdict module - per-outcome classification and run-level policy

mod classify;
mod policy;

pub use classify::{CaseStatus, is_pass};
pub use policy::{Verdict, VerdictPolicy, VerdictStatus};
