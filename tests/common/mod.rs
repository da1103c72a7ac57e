use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use edgardump::{
    Company, DetailedFiling, EdgarError, Filing, FilingSource, Format, HtmlFiling, PdfRenderer,
    RecentFilings, Result, Submission, parse_company_tickers,
};

pub fn fixture_path(relative: impl AsRef<Path>) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(relative)
}

pub fn read_fixture(relative: impl AsRef<Path>) -> String {
    fs::read_to_string(fixture_path(relative)).expect("fixture file should be readable")
}

#[allow(dead_code)]
pub fn edgar() -> edgardump::Edgar {
    edgardump::Edgar::new("test_agent example@example.com").unwrap()
}

/// Accession numbers of the fixture filings the default policy selects.
#[allow(dead_code)]
pub mod pct {
    pub const Q1_2024: &str = "0001830033-24-000050";
    pub const ANNUAL_2023: &str = "0001830033-24-000021";
    pub const PROSPECTUS: &str = "0001193125-21-150001";
}

/// A filing whose renderings can be made to fail per format.
#[allow(dead_code)]
pub struct MockFiling {
    inner: HtmlFiling,
    failing: Vec<Format>,
}

impl Filing for MockFiling {
    fn form(&self) -> &str {
        self.inner.form()
    }

    fn filing_date(&self) -> &str {
        self.inner.filing_date()
    }

    fn render(&self, format: Format) -> Result<String> {
        if self.failing.contains(&format) {
            return Err(EdgarError::RenderError {
                format: format.to_string(),
                reason: "conversion backend crashed".to_string(),
            });
        }
        self.inner.render(format)
    }
}

/// In-memory filing source built from the PureCycle fixtures.
#[allow(dead_code)]
pub struct FixtureSource {
    tickers: String,
    filings: Vec<DetailedFiling>,
    default_document: String,
    documents: HashMap<String, String>,
    failing_formats: HashMap<String, Vec<Format>>,
    broken_downloads: HashSet<String>,
}

#[allow(dead_code)]
impl FixtureSource {
    pub fn pct() -> Self {
        let submission: Submission =
            serde_json::from_str(&read_fixture("submissions/CIK0001830033.json")).unwrap();
        let page: RecentFilings = serde_json::from_str(&read_fixture(
            "submissions/CIK0001830033-submissions-001.json",
        ))
        .unwrap();

        let mut filings = submission.filings.recent.to_filings();
        filings.extend(page.to_filings());

        Self {
            tickers: read_fixture("company_tickers.json"),
            filings,
            default_document: read_fixture("documents/pct-20240331.htm"),
            documents: HashMap::new(),
            failing_formats: HashMap::new(),
            broken_downloads: HashSet::new(),
        }
    }

    /// Serves every document with `html`.
    pub fn with_default_document(mut self, html: &str) -> Self {
        self.default_document = html.to_string();
        self
    }

    pub fn with_document(mut self, accession: &str, html: &str) -> Self {
        self.documents.insert(accession.to_string(), html.to_string());
        self
    }

    pub fn with_failing_format(mut self, accession: &str, format: Format) -> Self {
        self.failing_formats
            .entry(accession.to_string())
            .or_default()
            .push(format);
        self
    }

    /// Makes `format` fail for every filing.
    pub fn with_failing_format_everywhere(mut self, format: Format) -> Self {
        for filing in &self.filings {
            self.failing_formats
                .entry(filing.accession_number.clone())
                .or_default()
                .push(format);
        }
        self
    }

    pub fn with_broken_download(mut self, accession: &str) -> Self {
        self.broken_downloads.insert(accession.to_string());
        self
    }

    /// Drops every filing whose form starts with `prefix`.
    pub fn without_form(mut self, prefix: &str) -> Self {
        self.filings.retain(|f| !f.form.starts_with(prefix));
        self
    }
}

#[async_trait]
impl FilingSource for FixtureSource {
    type Document = MockFiling;

    async fn resolve_company(&self, ticker: &str) -> Result<Company> {
        let tickers = parse_company_tickers(&self.tickers)?;
        Company::from_tickers(&tickers, ticker)
    }

    async fn filing_list(&self, _company: &Company) -> Result<Vec<DetailedFiling>> {
        Ok(self.filings.clone())
    }

    async fn fetch_document(&self, _company: &Company, filing: &DetailedFiling) -> Result<MockFiling> {
        if self.broken_downloads.contains(&filing.accession_number) {
            return Err(EdgarError::NotFound);
        }
        let html = self
            .documents
            .get(&filing.accession_number)
            .unwrap_or(&self.default_document);
        Ok(MockFiling {
            inner: HtmlFiling::new(filing.form.clone(), filing.filing_date.clone(), html.clone())
                .with_text_width(80),
            failing: self
                .failing_formats
                .get(&filing.accession_number)
                .cloned()
                .unwrap_or_default(),
        })
    }
}

/// Writes a placeholder PDF.
#[allow(dead_code)]
pub struct FakePdfRenderer;

#[async_trait]
impl PdfRenderer for FakePdfRenderer {
    async fn render_pdf(&self, html: &str, output: &Path) -> Result<()> {
        fs::write(output, format!("%PDF-1.4\n% {} bytes of html\n", html.len()))?;
        Ok(())
    }
}

/// Behaves like a converter that is not installed.
#[allow(dead_code)]
pub struct MissingPdfRenderer;

#[async_trait]
impl PdfRenderer for MissingPdfRenderer {
    async fn render_pdf(&self, _html: &str, _output: &Path) -> Result<()> {
        Err(EdgarError::BackendUnavailable(
            "PDF converter 'wkhtmltopdf' not found on PATH".to_string(),
        ))
    }
}
