//! PDF output through an external HTML-to-PDF converter.

use std::path::Path;

use async_trait::async_trait;

use crate::error::{EdgarError, Result};
use crate::traits::PdfRenderer;

/// Default converter program.
pub const DEFAULT_PDF_COMMAND: &str = "wkhtmltopdf";

/// Pipes HTML into a converter invoked as `program [args] - <output>`.
///
/// The default is `wkhtmltopdf --quiet --encoding utf-8`. Any program that reads
/// HTML from stdin when given `-` and writes the PDF to the path that follows works.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPdfRenderer {
    program: String,
    args: Vec<String>,
}

impl Default for CommandPdfRenderer {
    fn default() -> Self {
        Self {
            program: DEFAULT_PDF_COMMAND.to_string(),
            args: vec![
                "--quiet".to_string(),
                "--encoding".to_string(),
                "utf-8".to_string(),
            ],
        }
    }
}

impl CommandPdfRenderer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

#[cfg(feature = "pdf")]
#[async_trait]
impl PdfRenderer for CommandPdfRenderer {
    async fn render_pdf(&self, html: &str, output: &Path) -> Result<()> {
        use std::io::ErrorKind;
        use std::process::Stdio;
        use tokio::io::AsyncWriteExt;
        use tokio::process::Command;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg("-")
            .arg(output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => EdgarError::BackendUnavailable(format!(
                    "PDF converter '{}' not found on PATH",
                    self.program
                )),
                _ => EdgarError::PdfError(format!("Failed to start {}: {}", self.program, e)),
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| EdgarError::PdfError("Converter stdin was not captured".to_string()))?;

        let feed = async move {
            let written = stdin.write_all(html.as_bytes()).await;
            drop(stdin);
            written
        };
        let (written, finished) = tokio::join!(feed, child.wait_with_output());

        let finished = finished
            .map_err(|e| EdgarError::PdfError(format!("{} did not finish: {}", self.program, e)))?;

        if !finished.status.success() {
            let stderr = String::from_utf8_lossy(&finished.stderr);
            let preview: String = stderr.trim().chars().take(300).collect();
            return Err(EdgarError::PdfError(format!(
                "{} exited with {}: {}",
                self.program, finished.status, preview
            )));
        }

        written.map_err(|e| {
            EdgarError::PdfError(format!("Failed to send HTML to {}: {}", self.program, e))
        })?;

        if !output.is_file() {
            return Err(EdgarError::PdfError(format!(
                "{} reported success but wrote no {}",
                self.program,
                output.display()
            )));
        }

        Ok(())
    }
}

#[cfg(not(feature = "pdf"))]
#[async_trait]
impl PdfRenderer for CommandPdfRenderer {
    async fn render_pdf(&self, _html: &str, _output: &Path) -> Result<()> {
        Err(EdgarError::BackendUnavailable(
            "PDF output (built without the `pdf` feature)".to_string(),
        ))
    }
}
