//! # edgardump - export a company's SEC EDGAR filings to disk
//!
//! edgardump picks a small, fixed set of a company's filings from SEC EDGAR and writes
//! each one out as HTML, Markdown and plain text, plus a PDF per filing and a single
//! EPUB with one chapter per filing.
//!
//! ## Features
//!
//! - **Rate-limited EDGAR client** - Complies with SEC.gov fair access rules
//! - **Filing selection** - Latest quarterly reports, latest annual report, original prospectus
//! - **Format conversion** - HTML to Markdown (`markdown` feature) and text (`text` feature)
//! - **Bundles** - EPUB packaging (`epub` feature) and PDF through an external converter (`pdf` feature)
//! - **Failure isolation** - One broken document or format never aborts the run
//!
//! ## Requirements
//!
//! edgardump is async and needs a runtime; [tokio](https://tokio.rs) is what the binary uses.
//!
//! ## Basic Usage
//!
//! ```ignore
//! use edgardump::{Edgar, EdgarSource, ExportConfig, Exporter, SelectionPolicy};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // SEC.gov requires a user agent that identifies you
//!     let edgar = Edgar::new("YourAppName contact@example.com")?;
//!
//!     let config = ExportConfig::new()
//!         .with_output_root("exports")
//!         .with_policy(SelectionPolicy::new().with_quarterly_count(2));
//!
//!     let report = Exporter::new(EdgarSource::new(edgar), config).run("PCT").await?;
//!     for path in &report.written {
//!         println!("{}", path.display());
//!     }
//!
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod options;
mod traits;

mod company;
mod filings;

pub mod bundle;
mod export;
mod persist;
mod render;
mod selection;
mod source;

// Core Edgar functionality
pub use config::{EdgarConfig, EdgarUrls, ExportConfig};
pub use core::Edgar;
pub use error::{EdgarError, Result};
pub use options::FilingOptions;

// Data source types
pub use company::{Company, CompanyTicker, parse_company_tickers};
pub use filings::{DetailedFiling, FilingFile, FilingsData, RecentFilings, Submission};
pub use source::EdgarSource;

// Pipeline
pub use bundle::{CommandPdfRenderer, DEFAULT_PDF_COMMAND};
pub use export::{ExportFailure, ExportReport, Exporter, Stage};
pub use persist::{ensure_output_dir, output_filename, sanitize_form, write_file, write_rendering};
pub use render::{Format, HtmlFiling, Rendering, convert_html};
pub use selection::{MissingFormPolicy, SelectionPolicy};

// Traits
pub use traits::{CompanyOperations, Filing, FilingOperations, FilingSource, PdfRenderer};

/// Current crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
