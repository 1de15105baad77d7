//! Implements ReportPort. Writes the batch report as CSV.
//!
//! Columns: `line,input,number,status,reason`, one row per input line in line order.

use crate::domain::{BatchReport, DomainError};
use crate::ports::ReportPort;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

pub struct CsvReportWriter;

impl CsvReportWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReportWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Render the report entries as CSV text.
pub fn report_to_csv(report: &BatchReport) -> Result<String, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new());

    wtr.write_record(["line", "input", "number", "status", "reason"])?;
    for entry in report.entries() {
        let line = entry.line.map(|l| l.to_string()).unwrap_or_default();
        let number = entry
            .number
            .as_ref()
            .map(|n| n.to_string())
            .unwrap_or_default();
        wtr.write_record([
            line.as_str(),
            entry.input.as_str(),
            number.as_str(),
            entry.status.label(),
            entry.status.reason().unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    let bytes = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::other(e.to_string())))?;
    String::from_utf8(bytes).map_err(|e| {
        csv::Error::from(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })
}

#[async_trait::async_trait]
impl ReportPort for CsvReportWriter {
    async fn save_report(&self, report: &BatchReport, dest: &Path) -> Result<PathBuf, DomainError> {
        let body = report_to_csv(report).map_err(|e| DomainError::Report(e.to_string()))?;
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::Report(format!("{}: {}", parent.display(), e)))?;
        }
        fs::write(dest, body)
            .await
            .map_err(|e| DomainError::Report(format!("{}: {}", dest.display(), e)))?;
        info!(path = %dest.display(), rows = report.entries().len(), "report written");
        Ok(dest.to_path_buf())
    }
}
