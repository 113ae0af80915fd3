//! HTML to PDF via an external renderer command (weasyprint by default).
//! The HTML is staged in a temp directory; the command is invoked as
//! `<cmd> <input.html> <output.pdf>`.

use tokio::process::Command;
use tracing::{debug, error};

use crate::errors::AppError;

pub async fn render_pdf(pdf_command: &str, html: &str) -> Result<Vec<u8>, AppError> {
    let dir = tempfile::tempdir().map_err(|e| {
        AppError::Render(format!("failed to create temp dir for PDF render: {e}"))
    })?;
    let input = dir.path().join("resume.html");
    let output = dir.path().join("resume.pdf");

    tokio::fs::write(&input, html)
        .await
        .map_err(|e| AppError::Render(format!("failed to stage HTML: {e}")))?;

    let result = Command::new(pdf_command)
        .arg(&input)
        .arg(&output)
        .output()
        .await
        .map_err(|e| AppError::Render(format!("failed to run '{pdf_command}': {e}")))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        error!(command = pdf_command, %stderr, "PDF renderer exited with failure");
        return Err(AppError::Render(format!(
            "'{pdf_command}' exited with {}",
            result.status
        )));
    }

    let bytes = tokio::fs::read(&output)
        .await
        .map_err(|e| AppError::Render(format!("renderer produced no output: {e}")))?;
    debug!(size_kb = bytes.len() / 1024, "rendered PDF");
    Ok(bytes)
}
