//! The SEC EDGAR implementation of [`FilingSource`].

use async_trait::async_trait;

use super::company::Company;
use super::error::Result;
use super::filings::DetailedFiling;
use super::render::HtmlFiling;
use super::traits::{CompanyOperations, FilingOperations, FilingSource};
use super::Edgar;

/// Feeds the exporter from SEC.gov through an [`Edgar`] client.
///
/// Companies come from the ticker map, filing lists from the full submission history
/// and documents from each filing's primary HTML document.
#[derive(Debug)]
pub struct EdgarSource {
    edgar: Edgar,
    text_width: usize,
}

impl EdgarSource {
    pub fn new(edgar: Edgar) -> Self {
        Self {
            edgar,
            text_width: 100,
        }
    }

    /// Wrap width for plain-text renderings of the fetched documents.
    pub fn with_text_width(mut self, width: usize) -> Self {
        self.text_width = width;
        self
    }

    pub fn edgar(&self) -> &Edgar {
        &self.edgar
    }
}

#[async_trait]
impl FilingSource for EdgarSource {
    type Document = HtmlFiling;

    async fn resolve_company(&self, ticker: &str) -> Result<Company> {
        self.edgar.company(ticker).await
    }

    async fn filing_list(&self, company: &Company) -> Result<Vec<DetailedFiling>> {
        let filings = self.edgar.filing_history(&company.cik.to_string()).await?;
        tracing::debug!("{} filings on record for CIK {}", filings.len(), company.cik);
        Ok(filings)
    }

    async fn fetch_document(&self, company: &Company, filing: &DetailedFiling) -> Result<HtmlFiling> {
        let url = self
            .edgar
            .primary_document_url(&company.cik.to_string(), filing)?;
        tracing::debug!("Downloading {} {} from {}", filing.form, filing.filing_date, url);
        let html = self.edgar.get(&url).await?;
        Ok(HtmlFiling::new(filing.form.clone(), filing.filing_date.clone(), html)
            .with_text_width(self.text_width))
    }
}
