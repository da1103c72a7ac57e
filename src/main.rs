use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use edgardump::{
    CommandPdfRenderer, DEFAULT_PDF_COMMAND, Edgar, EdgarConfig, EdgarError, EdgarSource,
    ExportConfig, ExportReport, Exporter, Format, MissingFormPolicy, SelectionPolicy,
};
use tracing_subscriber::EnvFilter;

/// Export a company's latest quarterly reports, annual report and original prospectus
/// from SEC EDGAR as HTML, Markdown, text, PDF and EPUB.
#[derive(Debug, Parser)]
#[command(name = "edgardump", version)]
struct Args {
    /// Ticker symbol of the company to export.
    #[arg(default_value = "PCT")]
    ticker: String,

    /// SEC.gov-required user agent (e.g. "MyApp you@example.com").
    #[arg(long, env = "EDGAR_USER_AGENT")]
    user_agent: Option<String>,

    /// Existing directory the per-company output directory is created in.
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Number of recent quarterly reports (10-Q) to export.
    #[arg(short, long, default_value_t = 4)]
    quarters: usize,

    /// Formats to write, comma separated or repeated (html, md, txt).
    #[arg(
        short,
        long = "format",
        value_delimiter = ',',
        value_parser = parse_format,
        default_values_t = Format::ALL
    )]
    formats: Vec<Format>,

    /// Do not build the EPUB bundle.
    #[arg(long)]
    no_epub: bool,

    /// Do not render PDFs.
    #[arg(long)]
    no_pdf: bool,

    /// HTML-to-PDF converter, invoked as `<program> [args] - <output.pdf>`.
    #[arg(long, default_value = DEFAULT_PDF_COMMAND)]
    pdf_command: String,

    /// Argument passed to the PDF converter (repeatable).
    #[arg(long = "pdf-arg", allow_hyphen_values = true)]
    pdf_args: Vec<String>,

    /// Skip the annual report or prospectus when the company has none, instead of failing.
    #[arg(long)]
    skip_missing: bool,

    /// Count amendments (e.g. 10-Q/A) as filings of their base form.
    #[arg(long)]
    include_amendments: bool,

    /// Wrap width of the plain-text output.
    #[arg(long, default_value_t = 100)]
    text_width: usize,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_format(value: &str) -> std::result::Result<Format, String> {
    value.parse().map_err(|e: EdgarError| e.to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if args.text_width == 0 {
        anyhow::bail!("--text-width must be greater than zero");
    }

    let edgar = match &args.user_agent {
        Some(user_agent) => Edgar::new(user_agent),
        None => {
            tracing::warn!(
                "No --user-agent or EDGAR_USER_AGENT given; SEC.gov may reject anonymous requests"
            );
            Edgar::with_config(EdgarConfig::default())
        }
    }
    .context("failed to create Edgar client")?;

    let missing = if args.skip_missing {
        MissingFormPolicy::Skip
    } else {
        MissingFormPolicy::Fail
    };
    let policy = SelectionPolicy::new()
        .with_quarterly_count(args.quarters)
        .with_missing(missing)
        .with_include_amendments(args.include_amendments);

    let config = ExportConfig::new()
        .with_output_root(args.output_dir.clone())
        .with_formats(args.formats.clone())
        .with_policy(policy)
        .with_epub(!args.no_epub)
        .with_pdf(!args.no_pdf);

    let renderer = if args.pdf_args.is_empty() && args.pdf_command == DEFAULT_PDF_COMMAND {
        CommandPdfRenderer::default()
    } else {
        CommandPdfRenderer::new(&args.pdf_command, args.pdf_args.clone())
    };

    let source = EdgarSource::new(edgar).with_text_width(args.text_width);
    let exporter = Exporter::new(source, config).with_pdf_renderer(renderer);

    let report = exporter
        .run(&args.ticker)
        .await
        .with_context(|| format!("export of {} failed", args.ticker.to_uppercase()))?;

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &ExportReport) {
    println!(
        "{} ({}, CIK {})",
        report.company.name, report.ticker, report.company.cik
    );
    println!("  Output:    {}", report.output_dir.display());
    println!("  Filings:   {}", report.selected.len());
    for filing in &report.selected {
        println!("    {:<6} {}", filing.form, filing.filing_date);
    }
    println!("  Files:     {}", report.written.len());
    println!("  PDFs:      {}", report.pdfs.len());
    match &report.epub {
        Some(path) => println!("  EPUB:      {}", path.display()),
        None => println!("  EPUB:      none"),
    }
    if !report.is_complete() {
        println!("  Skipped:   {}", report.failures.len());
        for failure in &report.failures {
            println!("    {}", failure);
        }
    }
}
