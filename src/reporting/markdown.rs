use crate::workflows::Report;
use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::fmt::Write;

/// Human-readable rendering: a title, generation time, one heading per section.
pub fn render<Tz>(report: &Report, generated_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();
    let _ = writeln!(out, "# Reconnaissance Report: {}", report.target);
    let _ = writeln!(
        out,
        "\n_Generated on: {}_\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    );

    for section in &report.sections {
        let _ = writeln!(out, "## {}\n", heading(&section.title));
        let _ = writeln!(out, "{}\n", section.content.trim_end());
    }

    let _ = writeln!(out, "## Errors\n");
    if report.errors.is_empty() {
        let _ = writeln!(out, "None");
    } else {
        for error in &report.errors {
            let _ = writeln!(out, "- {}", error);
        }
    }
    out
}

/// `Web_Reconnaissance` -> `Web Reconnaissance`
fn heading(title: &str) -> String {
    title.replace('_', " ")
}
