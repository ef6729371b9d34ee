// src/core/report/mod.rs

// Report Reduction Engine: pure, CPU-only transformation of the raw
// assessment document into a `FilteredReport` with a narrative verdict.

pub mod extract;
pub mod summary;

pub use self::extract::{certificate_validity, reduce, reduce_at};
pub use self::summary::{grade_priority, summarize, Posture, Verdict};
