//! Report persistence.
//!
//! Consumes a compiled [`Report`] and writes it to disk as JSON, PDF and/or
//! Markdown. File names are `recon_<target>_<YYYYMMDD_HHMMSS>.<ext>` with the
//! target sanitized for the file system.

pub mod json;
pub mod markdown;
pub mod pdf;

use crate::types::Result;
use crate::workflows::Report;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Output format(s) for a finished report
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Pdf,
    Markdown,
    /// JSON and PDF
    #[default]
    Both,
    /// JSON, PDF and Markdown
    All,
}

impl ReportFormat {
    pub fn includes_json(&self) -> bool {
        matches!(self, ReportFormat::Json | ReportFormat::Both | ReportFormat::All)
    }

    pub fn includes_pdf(&self) -> bool {
        matches!(self, ReportFormat::Pdf | ReportFormat::Both | ReportFormat::All)
    }

    pub fn includes_markdown(&self) -> bool {
        matches!(self, ReportFormat::Markdown | ReportFormat::All)
    }
}

/// Writes reports below a fixed output directory.
pub struct ReportWriter {
    dir: PathBuf,
    format: ReportFormat,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>, format: ReportFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the report in every configured format, returning the created paths.
    pub fn write(&self, report: &Report, sanitized_target: &str) -> Result<Vec<PathBuf>> {
        self.write_at(report, sanitized_target, Local::now())
    }

    pub fn write_at(
        &self,
        report: &Report,
        sanitized_target: &str,
        generated_at: DateTime<Local>,
    ) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.dir)?;

        let mut written = Vec::new();
        if self.format.includes_json() {
            let path = self.file_path(sanitized_target, &generated_at, "json");
            fs::write(&path, json::render(report)?)?;
            info!(path = %path.display(), "JSON report written");
            written.push(path);
        }
        if self.format.includes_pdf() {
            let path = self.file_path(sanitized_target, &generated_at, "pdf");
            fs::write(&path, pdf::render(report, &generated_at)?)?;
            info!(path = %path.display(), "PDF report written");
            written.push(path);
        }
        if self.format.includes_markdown() {
            let path = self.file_path(sanitized_target, &generated_at, "md");
            fs::write(&path, markdown::render(report, &generated_at))?;
            info!(path = %path.display(), "Markdown report written");
            written.push(path);
        }
        Ok(written)
    }

    fn file_path(&self, sanitized_target: &str, at: &DateTime<Local>, ext: &str) -> PathBuf {
        self.dir.join(format!(
            "recon_{}_{}.{}",
            sanitized_target,
            at.format("%Y%m%d_%H%M%S"),
            ext
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::ReportSection;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn report() -> Report {
        Report {
            target: "example.com".to_string(),
            sections: vec![ReportSection {
                title: "Web_Reconnaissance".to_string(),
                content: "tech: nginx".to_string(),
            }],
            errors: vec![],
        }
    }

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap()
    }

    fn file_names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_write_both_formats() {
        let dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path().join("reports"), ReportFormat::Both);

        let paths = writer
            .write_at(&report(), "example.com", fixed_time())
            .unwrap();

        assert_eq!(
            file_names(&paths),
            vec![
                "recon_example.com_20260314_092653.json",
                "recon_example.com_20260314_092653.pdf"
            ]
        );
        assert!(paths.iter().all(|p| p.exists()));
        assert!(fs::read(&paths[1]).unwrap().starts_with(b"%PDF-"));
    }

    #[test]
    fn test_write_all_formats() {
        let dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path(), ReportFormat::All);
        let paths = writer.write_at(&report(), "x", fixed_time()).unwrap();

        assert_eq!(
            file_names(&paths),
            vec![
                "recon_x_20260314_092653.json",
                "recon_x_20260314_092653.pdf",
                "recon_x_20260314_092653.md"
            ]
        );
    }

    #[test]
    fn test_write_json_only() {
        let dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path(), ReportFormat::Json);
        let paths = writer.write_at(&report(), "x", fixed_time()).unwrap();

        assert_eq!(paths.len(), 1);
        let content = fs::read_to_string(&paths[0]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["Web_Reconnaissance"], "tech: nginx");
    }

    #[test]
    fn test_format_serde_names() {
        let format: ReportFormat = serde_json::from_str("\"pdf\"").unwrap();
        assert_eq!(format, ReportFormat::Pdf);
        assert!(ReportFormat::Both.includes_json());
        assert!(ReportFormat::Both.includes_pdf());
        assert!(!ReportFormat::Both.includes_markdown());
        assert!(!ReportFormat::Json.includes_pdf());
        assert!(ReportFormat::All.includes_markdown());
    }
}
