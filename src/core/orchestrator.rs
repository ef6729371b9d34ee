// src/core/orchestrator.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::core::client::AssessmentClient;
use crate::core::error::{ScanError, ScanResult};
use crate::core::models::{FilteredReport, ScanRequest, ScanSnapshot};
use crate::core::report::reduce;

/// Interval between two polls of the assessment service.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

static HOSTNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)*[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?$")
        .expect("hostname pattern is a valid regex")
});

/// Turns user input ("Example.com", "https://example.com/path") into a bare host name.
pub fn normalize_domain(input: &str) -> ScanResult<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ScanError::InvalidRequest("domain must not be empty".to_string()));
    }

    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let host = Url::parse(&with_scheme)
        .ok()
        .and_then(|url| url.host_str().map(|h| h.trim_end_matches('.').to_lowercase()))
        .filter(|host| HOSTNAME.is_match(host))
        .ok_or_else(|| ScanError::InvalidRequest(format!("'{}' is not a valid domain", trimmed)))?;

    Ok(host)
}

fn parse_scan_id(scan_id: &str) -> ScanResult<Uuid> {
    Uuid::parse_str(scan_id.trim())
        .map_err(|_| ScanError::InvalidRequest(format!("'{}' is not a valid scan ID", scan_id)))
}

// --- Scan Registry ---

/// Concurrency-safe map of scan requests, shared between the orchestrator and its workers.
///
/// Every operation is a single map lookup or assignment under one lock, so a
/// reader sees an entry either entirely before or entirely after an update.
#[derive(Debug, Default)]
pub struct ScanRegistry {
    entries: Mutex<HashMap<Uuid, ScanRequest>>,
}

impl ScanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Each critical section is a single assignment, so a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, ScanRequest>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, id: Uuid, request: ScanRequest) {
        self.lock().insert(id, request);
    }

    /// Replaces the entry only while it is still in progress; terminal entries are final.
    ///
    /// Returns `true` when the update was applied.
    pub fn update_if_in_progress(&self, id: &Uuid, request: ScanRequest) -> bool {
        let mut entries = self.lock();
        match entries.get_mut(id) {
            Some(entry) if !entry.status().is_terminal() => {
                *entry = request;
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<ScanSnapshot> {
        self.lock().get(id).map(ScanRequest::snapshot)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

// --- Orchestrator ---

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub poll_interval: Duration,
    /// Upper bound on a scan's lifetime. `None` lets a scan poll until the
    /// remote service reaches a terminal status or the scan is cancelled.
    pub max_scan_duration: Option<Duration>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_scan_duration: None,
        }
    }
}

/// A running scan worker and the signal that stops it.
#[derive(Debug)]
struct ScanHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

/// Starts scans in the background and answers status queries by scan ID.
pub struct Orchestrator<C: AssessmentClient> {
    client: Arc<C>,
    registry: Arc<ScanRegistry>,
    config: OrchestratorConfig,
    tasks: Mutex<HashMap<Uuid, ScanHandle>>,
    shutdown: CancellationToken,
}

impl<C: AssessmentClient> Orchestrator<C> {
    pub fn new(client: C, config: OrchestratorConfig) -> Self {
        Self::with_registry(Arc::new(client), Arc::new(ScanRegistry::new()), config)
    }

    pub fn with_registry(client: Arc<C>, registry: Arc<ScanRegistry>, config: OrchestratorConfig) -> Self {
        Self {
            client,
            registry,
            config,
            tasks: Mutex::new(HashMap::new()),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn registry(&self) -> &Arc<ScanRegistry> {
        &self.registry
    }

    fn tasks(&self) -> MutexGuard<'_, HashMap<Uuid, ScanHandle>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a scan for `domain` and launches its worker. Never waits on the network.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_scan(&self, domain: &str) -> ScanResult<Uuid> {
        if self.shutdown.is_cancelled() {
            return Err(ScanError::InvalidRequest("orchestrator is shut down".to_string()));
        }
        let domain = normalize_domain(domain)?;
        let scan_id = Uuid::new_v4();

        // The entry exists before the worker can run.
        self.registry.insert(scan_id, ScanRequest::InProgress);

        let token = self.shutdown.child_token();
        let task = tokio::spawn(scan_worker(
            Arc::clone(&self.client),
            Arc::clone(&self.registry),
            scan_id,
            domain.clone(),
            token.clone(),
            self.config.clone(),
        ));

        let mut tasks = self.tasks();
        tasks.retain(|_, handle| !handle.task.is_finished());
        tasks.insert(scan_id, ScanHandle { token, task });

        info!(%scan_id, domain = %domain, "Scan started.");
        Ok(scan_id)
    }

    /// Returns a consistent snapshot of the scan's status, result and error.
    pub fn get_scan_status(&self, scan_id: &str) -> ScanResult<ScanSnapshot> {
        let id = parse_scan_id(scan_id)?;
        self.registry
            .get(&id)
            .ok_or_else(|| ScanError::NotFound(scan_id.to_string()))
    }

    /// Stops a running scan; its entry moves to `error` with a cancellation reason.
    ///
    /// Cancelling a scan that already finished leaves it untouched.
    pub fn cancel_scan(&self, scan_id: &str) -> ScanResult<ScanSnapshot> {
        let id = parse_scan_id(scan_id)?;
        let snapshot = self
            .registry
            .get(&id)
            .ok_or_else(|| ScanError::NotFound(scan_id.to_string()))?;
        if snapshot.status.is_terminal() {
            debug!(%id, status = %snapshot.status, "Scan already finished, nothing to cancel.");
            return Ok(snapshot);
        }

        if let Some(handle) = self.tasks().get(&id) {
            handle.token.cancel();
        }
        self.registry
            .update_if_in_progress(&id, ScanRequest::Error(ScanError::Cancelled.to_string()));
        info!(%id, "Scan cancelled.");

        self.registry
            .get(&id)
            .ok_or_else(|| ScanError::NotFound(scan_id.to_string()))
    }

    /// Cancels every running scan and waits for the workers to record it.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let handles: Vec<ScanHandle> = self.tasks().drain().map(|(_, handle)| handle).collect();
        info!(workers = handles.len(), "Shutting down scan workers.");
        for handle in handles {
            if let Err(e) = handle.task.await {
                warn!(error = %e, "Scan worker ended abnormally.");
            }
        }
    }
}

impl<C: AssessmentClient> Drop for Orchestrator<C> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

// --- Scan Worker ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusHeader {
    status: Option<String>,
    status_message: Option<String>,
}

#[derive(Debug, PartialEq)]
enum Progress {
    Ready,
    Failed(String),
    Running(String),
}

fn read_progress(raw: &[u8]) -> ScanResult<Progress> {
    if raw.is_empty() {
        return Err(ScanError::EmptyInput);
    }
    let header: StatusHeader =
        serde_json::from_slice(raw).map_err(|e| ScanError::MalformedInput(e.to_string()))?;

    match header.status.as_deref() {
        Some("READY") => Ok(Progress::Ready),
        Some("ERROR") => Ok(Progress::Failed(
            header
                .status_message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "assessment reported ERROR".to_string()),
        )),
        Some(other) => Ok(Progress::Running(other.to_string())),
        None => Err(ScanError::MalformedInput(
            "assessment response has no status field".to_string(),
        )),
    }
}

async fn scan_worker<C: AssessmentClient>(
    client: Arc<C>,
    registry: Arc<ScanRegistry>,
    scan_id: Uuid,
    domain: String,
    token: CancellationToken,
    config: OrchestratorConfig,
) {
    let run = run_scan(client.as_ref(), &domain, &token, config.poll_interval);
    let outcome = match config.max_scan_duration {
        Some(limit) => tokio::time::timeout(limit, run)
            .await
            .unwrap_or_else(|_| Err(ScanError::TimedOut(limit))),
        None => run.await,
    };

    let entry = match outcome {
        Ok(report) => {
            info!(%scan_id, domain = %domain, endpoints = report.endpoints.len(), "Scan complete.");
            ScanRequest::Complete(report)
        }
        Err(e) => {
            warn!(%scan_id, domain = %domain, error = %e, "Scan failed.");
            ScanRequest::Error(e.to_string())
        }
    };
    registry.update_if_in_progress(&scan_id, entry);
}

async fn run_scan<C: AssessmentClient + ?Sized>(
    client: &C,
    domain: &str,
    token: &CancellationToken,
    poll_interval: Duration,
) -> ScanResult<FilteredReport> {
    let started = tokio::select! {
        biased;
        _ = token.cancelled() => return Err(ScanError::Cancelled),
        res = client.start_assessment(domain) => res?,
    };
    // A start response that already reports ERROR makes polling pointless.
    if let Ok(Progress::Failed(message)) = read_progress(&started) {
        return Err(ScanError::RemoteAssessment { domain: domain.to_string(), message });
    }

    loop {
        if token.is_cancelled() {
            return Err(ScanError::Cancelled);
        }
        let raw = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(ScanError::Cancelled),
            res = client.poll_assessment(domain) => res?,
        };

        match read_progress(&raw)? {
            Progress::Ready => return reduce(&raw),
            Progress::Failed(message) => {
                return Err(ScanError::RemoteAssessment { domain: domain.to_string(), message });
            }
            Progress::Running(status) => debug!(domain, status = %status, "Assessment still running."),
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => return Err(ScanError::Cancelled),
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }
}
