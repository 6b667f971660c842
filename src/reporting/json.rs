use crate::types::{AppError, Result};
use crate::workflows::Report;

/// Pretty-printed JSON with a trailing newline.
pub fn render(report: &Report) -> Result<String> {
    let mut body = report
        .to_json_pretty()
        .map_err(|e| AppError::Internal(format!("Failed to serialize report: {}", e)))?;
    body.push('\n');
    Ok(body)
}
