// src/lib.rs

//! Orchestrates remote TLS assessments for a domain and reduces the nested
//! assessment report into a compact risk summary with a single verdict.

pub mod config;
pub mod core;
pub mod logging;

pub use crate::core::client::{AssessmentClient, SslLabsClient};
pub use crate::core::error::{ScanError, ScanResult};
pub use crate::core::models::{FilteredReport, ScanSnapshot, ScanStatus};
pub use crate::core::orchestrator::{Orchestrator, OrchestratorConfig, ScanRegistry};
