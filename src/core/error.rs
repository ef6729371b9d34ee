// src/core/error.rs

use std::time::Duration;
use thiserror::Error;

/// Every failure the scan core can report.
///
/// Errors raised inside a scan worker never reach the caller of `start_scan`;
/// their `Display` text is what ends up in the registry entry's `error` field.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScanError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Scan request not found: {0}")]
    NotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Error during TLS assessment for domain {domain}: {message}")]
    RemoteAssessment { domain: String, message: String },

    #[error("Raw report is empty (no data received from the assessment service)")]
    EmptyInput,

    #[error("Malformed assessment report: {0}")]
    MalformedInput(String),

    #[error("Scan cancelled")]
    Cancelled,

    #[error("Scan exceeded its maximum duration of {0:?}")]
    TimedOut(Duration),
}

impl From<reqwest::Error> for ScanError {
    fn from(err: reqwest::Error) -> Self {
        ScanError::Transport(err.to_string())
    }
}

pub type ScanResult<T> = Result<T, ScanError>;
