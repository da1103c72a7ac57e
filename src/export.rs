//! The export pipeline: select, render, persist, bundle.
//!
//! ```text
//! ticker ─► resolve_company ─► filing_list ─► SelectionPolicy::select
//!                                                   │
//!           ┌───────────────────────────────────────┘
//!           ▼ per filing (in selection order)
//!      fetch_document ─► render(format) ─► write {ticker}_{form}_{date}.{ext}
//!                                 │
//!                                 └─► HTML renderings ─► EPUB + one PDF each
//! ```
//!
//! Company lookup, filing listing and selection are fatal. Everything after that is
//! isolated: a document that cannot be fetched skips its filing, a format that fails to
//! render or write skips that one file, and bundle failures skip the bundle. Each of
//! these lands in [`ExportReport::failures`].

use std::fmt;
use std::path::PathBuf;

use super::bundle::{self, CommandPdfRenderer};
use super::company::Company;
use super::config::ExportConfig;
use super::error::{EdgarError, Result};
use super::filings::DetailedFiling;
use super::persist::{ensure_output_dir, output_filename, write_file, write_rendering};
use super::render::{Format, Rendering};
use super::traits::{Filing, FilingSource, PdfRenderer};

/// Pipeline step a recoverable failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Download,
    Render(Format),
    Write(Format),
    Epub,
    Pdf,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Download => f.write_str("download"),
            Stage::Render(format) => write!(f, "{} rendering", format),
            Stage::Write(format) => write!(f, "{} write", format),
            Stage::Epub => f.write_str("EPUB"),
            Stage::Pdf => f.write_str("PDF"),
        }
    }
}

/// A recoverable failure that was logged and skipped.
#[derive(Debug)]
pub struct ExportFailure {
    pub stage: Stage,
    /// `{form} {filing_date}` of the affected filing; `None` for the EPUB.
    pub filing: Option<String>,
    pub error: EdgarError,
}

impl fmt::Display for ExportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.filing {
            Some(filing) => write!(f, "{} failed for {}: {}", self.stage, filing, self.error),
            None => write!(f, "{} failed: {}", self.stage, self.error),
        }
    }
}

/// What a run produced.
#[derive(Debug)]
pub struct ExportReport {
    pub company: Company,
    /// Ticker used for the output directory and filenames
    pub ticker: String,
    pub output_dir: PathBuf,
    pub selected: Vec<DetailedFiling>,
    /// Rendering files, in write order
    pub written: Vec<PathBuf>,
    pub epub: Option<PathBuf>,
    pub pdfs: Vec<PathBuf>,
    pub failures: Vec<ExportFailure>,
}

impl ExportReport {
    /// True when nothing was skipped.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, stage: Stage, filing: Option<String>, error: EdgarError) {
        let failure = ExportFailure {
            stage,
            filing,
            error,
        };
        tracing::warn!("{}", failure);
        self.failures.push(failure);
    }
}

/// Runs the export pipeline against a [`FilingSource`].
///
/// # Examples
///
/// ```rust,no_run
/// use edgardump::{Edgar, EdgarSource, ExportConfig, Exporter};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let edgar = Edgar::new("my_app/1.0 (my@email.com)")?;
/// let exporter = Exporter::new(EdgarSource::new(edgar), ExportConfig::default());
/// let report = exporter.run("PCT").await?;
/// println!("{} files in {}", report.written.len(), report.output_dir.display());
/// # Ok(())
/// # }
/// ```
pub struct Exporter<S: FilingSource> {
    source: S,
    config: ExportConfig,
    pdf_renderer: Box<dyn PdfRenderer>,
}

impl<S: FilingSource> Exporter<S> {
    /// Creates an exporter that renders PDFs with the default [`CommandPdfRenderer`].
    pub fn new(source: S, config: ExportConfig) -> Self {
        Self {
            source,
            config,
            pdf_renderer: Box::new(CommandPdfRenderer::default()),
        }
    }

    pub fn with_pdf_renderer(mut self, renderer: impl PdfRenderer + 'static) -> Self {
        self.pdf_renderer = Box::new(renderer);
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Exports the selected filings of `ticker` into `{output_root}/{TICKER}`.
    ///
    /// # Errors
    ///
    /// * `EdgarError::TickerNotFound` - the ticker is unknown to the source
    /// * `EdgarError::MissingForm` - a required form is absent under `MissingFormPolicy::Fail`
    /// * `EdgarError::FileError` - the output directory cannot be created
    /// * any error the source returns while resolving the company or listing filings
    pub async fn run(&self, ticker: &str) -> Result<ExportReport> {
        let ticker = ticker.trim().to_uppercase();
        let company = self.source.resolve_company(&ticker).await?;
        tracing::info!("Resolved {} to {} (CIK {})", ticker, company.name, company.cik);

        let filings = self.source.filing_list(&company).await?;
        let selected = self.config.policy.select(&filings)?;
        tracing::info!("Selected {} filings for {}", selected.len(), ticker);

        let output_dir = ensure_output_dir(&self.config.output_root, &ticker)?;

        let mut report = ExportReport {
            company,
            ticker,
            output_dir,
            selected,
            written: Vec::new(),
            epub: None,
            pdfs: Vec::new(),
            failures: Vec::new(),
        };

        let html = self.export_filings(&mut report).await;

        if self.config.epub {
            self.write_epub(&mut report, &html);
        }
        if self.config.pdf {
            self.write_pdfs(&mut report, &html).await;
        }

        Ok(report)
    }

    /// Renders and persists every selected filing, returning the HTML renderings.
    async fn export_filings(&self, report: &mut ExportReport) -> Vec<Rendering> {
        let formats = self.config.render_formats();
        let mut html = Vec::new();

        for filing in report.selected.clone() {
            let label = format!("{} {}", filing.form, filing.filing_date);
            let fetched = self.source.fetch_document(&report.company, &filing).await;
            let document = match fetched {
                Ok(document) => document,
                Err(e) => {
                    report.fail(Stage::Download, Some(label), e);
                    continue;
                }
            };

            for &format in &formats {
                let content = match document.render(format) {
                    Ok(content) => content,
                    Err(e) => {
                        report.fail(Stage::Render(format), Some(label.clone()), e);
                        continue;
                    }
                };

                let rendering = Rendering {
                    filename: output_filename(
                        &report.ticker,
                        document.form(),
                        document.filing_date(),
                        format.extension(),
                    ),
                    content,
                    form: document.form().to_string(),
                    filing_date: document.filing_date().to_string(),
                    format,
                };

                if self.config.formats.contains(&format) {
                    match write_rendering(&report.output_dir, &rendering) {
                        Ok(path) => {
                            tracing::info!("Saved {}", path.display());
                            report.written.push(path);
                        }
                        Err(e) => report.fail(Stage::Write(format), Some(label.clone()), e),
                    }
                }

                if format == Format::Html {
                    html.push(rendering);
                }
            }
        }

        html
    }

    fn write_epub(&self, report: &mut ExportReport, html: &[Rendering]) {
        if html.iter().all(Rendering::is_blank) {
            tracing::info!("No HTML renderings, skipping EPUB");
            return;
        }

        let bytes = match bundle::build_epub(&report.company, &report.ticker, html) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::info!("No EPUB chapters produced, skipping EPUB");
                return;
            }
            Err(e) => {
                report.fail(Stage::Epub, None, e);
                return;
            }
        };

        match write_file(&report.output_dir, &bundle::epub_filename(&report.ticker), &bytes) {
            Ok(path) => {
                tracing::info!("Created EPUB {}", path.display());
                report.epub = Some(path);
            }
            Err(e) => report.fail(Stage::Epub, None, e),
        }
    }

    async fn write_pdfs(&self, report: &mut ExportReport, html: &[Rendering]) {
        for rendering in html.iter().filter(|r| !r.is_blank()) {
            let label = format!("{} {}", rendering.form, rendering.filing_date);
            let path = report.output_dir.join(output_filename(
                &report.ticker,
                &rendering.form,
                &rendering.filing_date,
                "pdf",
            ));

            let rendered = self.pdf_renderer.render_pdf(&rendering.content, &path).await;
            match rendered {
                Ok(()) => {
                    tracing::info!("Created PDF {}", path.display());
                    report.pdfs.push(path);
                }
                Err(e @ EdgarError::BackendUnavailable(_)) => {
                    report.fail(Stage::Pdf, Some(label), e);
                    tracing::warn!("PDF backend unavailable, skipping remaining PDFs");
                    break;
                }
                Err(e) => report.fail(Stage::Pdf, Some(label), e),
            }
        }
    }
}
