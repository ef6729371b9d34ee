// src/core/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

// --- Scan Lifecycle Models ---

/// Lifecycle state of a scan request.
///
/// The wire names (`IN_PROGRESS`, `complete`, `error`) are the ones front ends
/// already consume, so both the serde and the `Display` representations keep them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum ScanStatus {
    #[serde(rename = "IN_PROGRESS")]
    #[strum(serialize = "IN_PROGRESS")]
    InProgress,
    #[serde(rename = "complete")]
    #[strum(serialize = "complete")]
    Complete,
    #[serde(rename = "error")]
    #[strum(serialize = "error")]
    Error,
}

impl ScanStatus {
    /// `complete` and `error` are terminal: no transition leaves them.
    pub fn is_terminal(self) -> bool {
        !matches!(self, ScanStatus::InProgress)
    }
}

/// One entry of the scan registry.
///
/// Kept as an enum so that a result can only exist next to `complete` and an
/// error message only next to `error`.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanRequest {
    InProgress,
    Complete(FilteredReport),
    Error(String),
}

impl ScanRequest {
    pub fn status(&self) -> ScanStatus {
        match self {
            ScanRequest::InProgress => ScanStatus::InProgress,
            ScanRequest::Complete(_) => ScanStatus::Complete,
            ScanRequest::Error(_) => ScanStatus::Error,
        }
    }

    /// Flattens the entry into the `{status, result, error}` shape returned to callers.
    pub fn snapshot(&self) -> ScanSnapshot {
        match self {
            ScanRequest::InProgress => ScanSnapshot {
                status: ScanStatus::InProgress,
                result: None,
                error: None,
            },
            ScanRequest::Complete(report) => ScanSnapshot {
                status: ScanStatus::Complete,
                result: Some(report.clone()),
                error: None,
            },
            ScanRequest::Error(message) => ScanSnapshot {
                status: ScanStatus::Error,
                result: None,
                error: Some(message.clone()),
            },
        }
    }
}

/// Point-in-time copy of a registry entry, as returned by a status query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSnapshot {
    pub status: ScanStatus,
    pub result: Option<FilteredReport>,
    pub error: Option<String>,
}

// --- Reduced Report Models ---

/// Certificate facts kept from the raw assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredCertificate {
    pub subject: String,
    pub issuer: String,
    pub validity_years: f64,
    pub expires_in_days: f64,
}

/// Security-relevant view of a single server IP of the assessed host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredEndpoint {
    pub ip_address: String,
    pub status_message: String,
    pub grade: String,
    pub has_warnings: bool,
    pub is_exceptional: bool,
    pub certificate: Option<FilteredCertificate>,
    pub protocols: Vec<String>,
    pub negotiated_cipher_strength: f64,
    pub max_cipher_strength: f64,
    pub has_weak_ciphers: bool,
    pub hsts: String,
    pub server: String,
    #[serde(rename = "issues")]
    pub chain_issues: i64,
}

/// The compact report produced by the reduction engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredReport {
    pub host: String,
    pub web_protocol: String,
    pub endpoints: Vec<FilteredEndpoint>,
    pub summary: String,
    pub timestamp: DateTime<Utc>,
}
