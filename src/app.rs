// src/app.rs

use ratatui::widgets::ScrollbarState;
use tracing::{info, warn};
use uuid::Uuid;

use tls_verdict::core::export::export_report;
use tls_verdict::core::models::{FilteredReport, ScanSnapshot, ScanStatus};
use tls_verdict::core::report::Posture;
use tls_verdict::logging::get_export_dir;
use tls_verdict::{AssessmentClient, Orchestrator};

pub const SPINNER_CHARS: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub enum ExportStatus {
    Idle,
    Success(String),
    Error(String),
}

pub enum AppState {
    Idle,
    Scanning,
    Finished,
}

pub struct App {
    pub should_quit: bool,
    pub state: AppState,
    pub input: String,
    pub input_error: Option<String>,
    pub scan_id: Option<Uuid>,
    pub snapshot: Option<ScanSnapshot>,
    pub posture: Option<Posture>,
    pub spinner_frame: usize,
    pub scroll_offset: usize,
    pub report_scroll_state: ScrollbarState,
    pub export_status: ExportStatus,
}

impl App {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            state: AppState::Idle,
            input: String::new(),
            input_error: None,
            scan_id: None,
            snapshot: None,
            posture: None,
            spinner_frame: 0,
            scroll_offset: 0,
            report_scroll_state: ScrollbarState::default(),
            export_status: ExportStatus::Idle,
        }
    }

    /// Finished report, if the scan completed.
    pub fn report(&self) -> Option<&FilteredReport> {
        self.snapshot.as_ref().and_then(|s| s.result.as_ref())
    }

    /// Terminal error of the scan, if it failed.
    pub fn scan_error(&self) -> Option<&str> {
        self.snapshot.as_ref().and_then(|s| s.error.as_deref())
    }

    pub fn submit<C: AssessmentClient>(&mut self, orchestrator: &Orchestrator<C>) {
        match orchestrator.start_scan(&self.input) {
            Ok(scan_id) => {
                self.scan_id = Some(scan_id);
                self.snapshot = None;
                self.input_error = None;
                self.state = AppState::Scanning;
            }
            Err(e) => {
                warn!(input = %self.input, error = %e, "Scan request rejected.");
                self.input_error = Some(e.to_string());
            }
        }
    }

    pub fn cancel<C: AssessmentClient>(&mut self, orchestrator: &Orchestrator<C>) {
        if let Some(scan_id) = self.scan_id {
            if let Err(e) = orchestrator.cancel_scan(&scan_id.to_string()) {
                warn!(%scan_id, error = %e, "Could not cancel scan.");
            }
        }
    }

    /// Advances the spinner and polls the orchestrator for the running scan.
    pub fn on_tick<C: AssessmentClient>(&mut self, orchestrator: &Orchestrator<C>) {
        if !matches!(self.state, AppState::Scanning) {
            return;
        }
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_CHARS.len();

        let Some(scan_id) = self.scan_id else { return };
        match orchestrator.get_scan_status(&scan_id.to_string()) {
            Ok(snapshot) if snapshot.status != ScanStatus::InProgress => {
                info!(%scan_id, status = %snapshot.status, "Scan reached a terminal status.");
                self.posture = snapshot
                    .result
                    .as_ref()
                    .and_then(|report| Posture::from_endpoints(&report.endpoints));
                self.snapshot = Some(snapshot);
                self.state = AppState::Finished;
            }
            Ok(snapshot) => self.snapshot = Some(snapshot),
            Err(e) => {
                warn!(%scan_id, error = %e, "Status query failed.");
                self.state = AppState::Finished;
            }
        }
    }

    pub fn export(&mut self) {
        let Some(report) = self.report() else {
            self.export_status = ExportStatus::Error("No report to export.".to_string());
            return;
        };
        self.export_status = match export_report(report, &get_export_dir()) {
            Ok(path) => ExportStatus::Success(path.display().to_string()),
            Err(e) => ExportStatus::Error(e.to_string()),
        };
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
        self.report_scroll_state = self.report_scroll_state.position(self.scroll_offset);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(1);
        self.report_scroll_state = self.report_scroll_state.position(self.scroll_offset);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn reset(&mut self) {
        self.state = AppState::Idle;
        self.input = String::new();
        self.input_error = None;
        self.scan_id = None;
        self.snapshot = None;
        self.posture = None;
        self.spinner_frame = 0;
        self.scroll_offset = 0;
        self.report_scroll_state = ScrollbarState::default();
        self.export_status = ExportStatus::Idle;
    }
}
