// src/ui/widgets/mod.rs

pub mod footer;      // Key hints and export feedback.
pub mod input;       // Target domain input box.
pub mod report_view; // Narrative and per-endpoint details.
pub mod summary;     // Grade, verdict and security checks.
