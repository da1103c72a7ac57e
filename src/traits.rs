//! Trait definitions for the data source and the documents it yields.
//!
//! `CompanyOperations` and `FilingOperations` group the raw EDGAR endpoints the
//! `Edgar` client exposes. `FilingSource` and `Filing` are the seams the exporter is
//! written against: the exporter never talks to SEC.gov directly, so tests (or another
//! backend) can substitute any source that can name a company, list its filings and
//! hand back renderable documents. `PdfRenderer` does the same for PDF output.

use super::company::{Company, CompanyTicker};
use super::error::Result;
use super::filings::{DetailedFiling, Submission};
use super::options::FilingOptions;
use super::render::Format;
use async_trait::async_trait;
use std::path::Path;

/// Operations for resolving tickers into registrants.
#[async_trait]
pub trait CompanyOperations {
    /// Retrieves the full ticker map in SEC order.
    async fn company_tickers(&self) -> Result<Vec<CompanyTicker>>;
    /// Retrieves the Central Index Key (CIK) for a ticker symbol.
    async fn company_cik(&self, ticker: &str) -> Result<u64>;
    /// Resolves a ticker into a company with all of its tickers.
    async fn company(&self, ticker: &str) -> Result<Company>;
}

/// Operations for reading submission histories and filing documents.
#[async_trait]
pub trait FilingOperations {
    /// Retrieves all submissions for a company identified by CIK.
    async fn submissions(&self, cik: &str) -> Result<Submission>;
    /// Returns the recent filings block as filing rows.
    async fn get_recent_filings(&self, cik: &str) -> Result<Vec<DetailedFiling>>;
    /// Returns recent filings plus every older history page.
    async fn filing_history(&self, cik: &str) -> Result<Vec<DetailedFiling>>;
    /// Retrieves recent filings filtered by the given options.
    async fn filings(&self, cik: &str, opts: Option<FilingOptions>) -> Result<Vec<DetailedFiling>>;
    /// Builds the archive URL of a filing's primary document.
    fn primary_document_url(&self, cik: &str, filing: &DetailedFiling) -> Result<String>;
    /// Downloads a filing's primary document.
    async fn primary_document(&self, cik: &str, filing: &DetailedFiling) -> Result<String>;
}

/// A filing that can render itself in the textual formats.
pub trait Filing: Send + Sync {
    /// Form type code, e.g. `10-Q`.
    fn form(&self) -> &str;
    /// Filing date, `YYYY-MM-DD`.
    fn filing_date(&self) -> &str;
    /// Produces the filing's content in `format`.
    fn render(&self, format: Format) -> Result<String>;
}

/// Where the exporter gets its companies, filing lists and documents from.
#[async_trait]
pub trait FilingSource: Send + Sync {
    type Document: Filing;

    /// Resolves a ticker into a company.
    async fn resolve_company(&self, ticker: &str) -> Result<Company>;
    /// Lists every filing the company has on record.
    async fn filing_list(&self, company: &Company) -> Result<Vec<DetailedFiling>>;
    /// Fetches one filing as a renderable document.
    async fn fetch_document(
        &self,
        company: &Company,
        filing: &DetailedFiling,
    ) -> Result<Self::Document>;
}

/// Turns one HTML document into a PDF file.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    /// Renders `html` and writes the PDF to `output`, replacing any existing file.
    async fn render_pdf(&self, html: &str, output: &Path) -> Result<()>;
}
