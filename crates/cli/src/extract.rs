// Plain-text extraction from input documents.
//
// PDFs go through `pdftotext -layout`; anything else is read as text.
// Every failure degrades to an empty string with a warning, so a missing
// document never blocks budget generation.

use std::path::Path;
use std::process::Command;

/// Extract text from one document.
pub fn document_text(path: &Path) -> String {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);

    let result = if is_pdf { run_pdftotext(path) } else { read_text(path) };
    match result {
        Ok(text) => {
            log::debug!("extracted {} chars from {}", text.len(), path.display());
            text
        }
        Err(e) => {
            log::warn!("no text from {}: {}", path.display(), e);
            String::new()
        }
    }
}

/// Extract and concatenate text from several documents, in order.
pub fn documents_text(paths: &[impl AsRef<Path>]) -> String {
    paths
        .iter()
        .map(|p| document_text(p.as_ref()))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn read_text(path: &Path) -> Result<String, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Run `pdftotext -layout <file> -` and capture stdout.
fn run_pdftotext(path: &Path) -> Result<String, String> {
    which::which("pdftotext").map_err(|_| "pdftotext not installed (poppler-utils)".to_string())?;

    let output = Command::new("pdftotext")
        .arg("-layout")
        .arg(path)
        .arg("-")
        .output()
        .map_err(|e| format!("failed to run pdftotext: {}", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "pdftotext failed (exit {}): {}",
            output.status.code().unwrap_or(-1),
            stderr.trim()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
