// src/core/export.rs

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::core::models::FilteredReport;

/// Saves `report` as pretty-printed JSON under `dir` and returns the written path.
///
/// The file is named after the host and the report timestamp, e.g.
/// `example.com-20250601T120000Z.json`.
pub fn export_report(report: &FilteredReport, dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let host: String = report
        .host
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    let host = if host.is_empty() { "report".to_string() } else { host };
    let file_name = format!("{}-{}.json", host, report.timestamp.format("%Y%m%dT%H%M%SZ"));
    let path = dir.join(file_name);

    let json = serde_json::to_string_pretty(report).map_err(|e| {
        error!(error = %e, "Failed to serialize report for export.");
        io::Error::new(io::ErrorKind::InvalidData, e)
    })?;
    fs::write(&path, json)?;

    info!(path = %path.display(), "Report exported.");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn report(host: &str) -> FilteredReport {
        FilteredReport {
            host: host.to_string(),
            web_protocol: "http".to_string(),
            endpoints: Vec::new(),
            summary: "No valid information could be obtained from the TLS analysis.".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn writes_json_named_after_host_and_time() {
        let dir = TempDir::new().unwrap();

        let path = export_report(&report("example.com"), dir.path()).unwrap();

        assert_eq!(path.file_name().unwrap(), "example.com-20250601T120000Z.json");
        let saved: FilteredReport = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved, report("example.com"));
    }

    #[test]
    fn unsafe_host_characters_are_replaced() {
        let dir = TempDir::new().unwrap();

        let path = export_report(&report("../evil/host"), dir.path()).unwrap();

        assert_eq!(path.parent().unwrap(), dir.path());
        assert_eq!(path.file_name().unwrap(), ".._evil_host-20250601T120000Z.json");
    }
}
