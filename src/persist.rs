use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::error::{EdgarError, Result};
use super::render::Rendering;

/// Makes a form code safe to embed in a filename (`S-1/A` becomes `S-1-A`).
pub fn sanitize_form(form: &str) -> String {
    form.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '-',
            c if c.is_whitespace() => '-',
            c => c,
        })
        .collect()
}

/// `{ticker}_{form}_{filing_date}.{ext}`
pub fn output_filename(ticker: &str, form: &str, filing_date: &str, extension: &str) -> String {
    format!(
        "{}_{}_{}.{}",
        ticker,
        sanitize_form(form),
        filing_date,
        extension
    )
}

/// Creates `{root}/{ticker}` if needed and returns it.
///
/// Only the last component is created; a missing `root` is an error.
pub fn ensure_output_dir(root: &Path, ticker: &str) -> Result<PathBuf> {
    let dir = root.join(ticker);
    match fs::create_dir(&dir) {
        Ok(()) => {
            tracing::debug!("Created {}", dir.display());
            Ok(dir)
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists && dir.is_dir() => Ok(dir),
        Err(e) => Err(EdgarError::FileError(e)),
    }
}

/// Writes `bytes` to `dir/filename`, replacing any previous file.
pub fn write_file(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
    let path = dir.join(filename);
    fs::write(&path, bytes)?;
    Ok(path)
}

/// Writes a rendering's UTF-8 content under its deterministic filename.
pub fn write_rendering(dir: &Path, rendering: &Rendering) -> Result<PathBuf> {
    write_file(dir, &rendering.filename, rendering.content.as_bytes())
}
