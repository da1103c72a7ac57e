use super::Edgar;
use super::error::{EdgarError, Result};
use super::options::FilingOptions;
use super::traits::FilingOperations;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    pub cik: String,
    #[serde(rename = "entityType", default)]
    pub entity_type: String,
    #[serde(default)]
    pub sic: String,
    #[serde(rename = "sicDescription", default)]
    pub sic_description: String,
    pub name: String,
    #[serde(default)]
    pub tickers: Vec<String>,
    #[serde(default)]
    pub exchanges: Vec<String>,
    #[serde(rename = "fiscalYearEnd")]
    pub fiscal_year_end: Option<String>,
    pub filings: FilingsData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilingsData {
    pub recent: RecentFilings,
    #[serde(default)]
    pub files: Vec<FilingFile>,
}

/// An older page of a company's submission history.
#[derive(Debug, Clone, Deserialize)]
pub struct FilingFile {
    pub name: String,
    #[serde(rename = "filingCount")]
    pub filing_count: u64,
    #[serde(rename = "filingFrom")]
    pub filing_from: String,
    #[serde(rename = "filingTo")]
    pub filing_to: String,
}

/// Column-oriented filing table, as used by both the `recent` block and history pages.
#[derive(Debug, Clone, Deserialize)]
pub struct RecentFilings {
    #[serde(rename = "accessionNumber")]
    pub accession_number: Vec<String>,
    #[serde(rename = "filingDate")]
    pub filing_date: Vec<String>,
    #[serde(rename = "reportDate")]
    pub report_date: Option<Vec<String>>,
    #[serde(rename = "acceptanceDateTime")]
    pub acceptance_date_time: Vec<String>,
    pub form: Vec<String>,
    #[serde(rename = "fileNumber")]
    pub file_number: Option<Vec<String>>,
    pub size: Option<Vec<i64>>,
    #[serde(rename = "isXBRL")]
    pub is_xbrl: Option<Vec<i32>>,
    #[serde(rename = "isInlineXBRL")]
    pub is_inline_xbrl: Option<Vec<i32>>,
    #[serde(rename = "primaryDocument")]
    pub primary_document: Option<Vec<String>>,
    #[serde(rename = "primaryDocDescription")]
    pub primary_doc_description: Option<Vec<String>>,
}

/// One row of a company's filing table.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailedFiling {
    pub accession_number: String,
    pub filing_date: String,
    pub report_date: Option<String>,
    pub acceptance_date_time: DateTime<FixedOffset>,
    pub form: String,
    pub file_number: Option<String>,
    pub size: Option<i64>,
    pub is_xbrl: bool,
    pub is_inline_xbrl: bool,
    pub primary_document: Option<String>,
    pub primary_doc_description: Option<String>,
}

impl DetailedFiling {
    /// Builds a filing row from its identifying columns; everything else is left empty.
    pub fn new(
        accession_number: impl Into<String>,
        form: impl Into<String>,
        filing_date: impl Into<String>,
        acceptance_date_time: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            accession_number: accession_number.into(),
            filing_date: filing_date.into(),
            report_date: None,
            acceptance_date_time,
            form: form.into(),
            file_number: None,
            size: None,
            is_xbrl: false,
            is_inline_xbrl: false,
            primary_document: None,
            primary_doc_description: None,
        }
    }

    pub fn with_primary_document(mut self, document: impl Into<String>) -> Self {
        self.primary_document = Some(document.into());
        self
    }

    /// The filing date as a calendar date, if it is well formed.
    pub fn filed_on(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.filing_date, "%Y-%m-%d").ok()
    }
}

impl RecentFilings {
    fn get_vec_item_at<T: Clone>(&self, vec_opt: &Option<Vec<T>>, idx: usize) -> Option<T> {
        vec_opt.as_ref().and_then(|v| v.get(idx).cloned())
    }

    fn get_bool_at(&self, vec_opt: &Option<Vec<i32>>, idx: usize) -> bool {
        vec_opt
            .as_ref()
            .and_then(|v| v.get(idx))
            .is_some_and(|flag| *flag == 1)
    }

    pub fn len(&self) -> usize {
        self.accession_number.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accession_number.is_empty()
    }

    /// Converts every well-formed row; rows with unparseable timestamps are skipped.
    pub fn to_filings(&self) -> Vec<DetailedFiling> {
        (0..self.len())
            .filter_map(|idx| match DetailedFiling::try_from((self, idx)) {
                Ok(filing) => Some(filing),
                Err(err) => {
                    tracing::debug!("Skipping filing row {}: {}", idx, err);
                    None
                }
            })
            .collect()
    }
}

impl TryFrom<(&RecentFilings, usize)> for DetailedFiling {
    type Error = EdgarError;

    fn try_from((recent, idx): (&RecentFilings, usize)) -> Result<Self> {
        let column = |values: &Vec<String>, name: &str| {
            values.get(idx).cloned().ok_or_else(|| {
                EdgarError::InvalidResponse(format!("Filing table column '{}' too short", name))
            })
        };

        let raw_acceptance = column(&recent.acceptance_date_time, "acceptanceDateTime")?;
        let acceptance_date_time = DateTime::parse_from_rfc3339(&raw_acceptance).map_err(|e| {
            EdgarError::InvalidResponse(format!("Invalid acceptance time '{}': {}", raw_acceptance, e))
        })?;

        Ok(DetailedFiling {
            accession_number: column(&recent.accession_number, "accessionNumber")?,
            filing_date: column(&recent.filing_date, "filingDate")?,
            report_date: recent.get_vec_item_at(&recent.report_date, idx),
            acceptance_date_time,
            form: column(&recent.form, "form")?,
            file_number: recent.get_vec_item_at(&recent.file_number, idx),
            size: recent.get_vec_item_at(&recent.size, idx),
            is_xbrl: recent.get_bool_at(&recent.is_xbrl, idx),
            is_inline_xbrl: recent.get_bool_at(&recent.is_inline_xbrl, idx),
            primary_document: recent.get_vec_item_at(&recent.primary_document, idx),
            primary_doc_description: recent.get_vec_item_at(&recent.primary_doc_description, idx),
        })
    }
}

#[derive(Debug)]
enum UrlType {
    Submission,
    SubmissionFile,
    FilingContent,
}

impl Edgar {
    fn build_url(&self, url_type: UrlType, params: &[&str]) -> String {
        match url_type {
            UrlType::Submission => {
                let cik = format!("{:0>10}", params[0]);
                format!("{}/submissions/CIK{}.json", self.edgar_data_url, cik)
            }
            UrlType::SubmissionFile => {
                format!("{}/submissions/{}", self.edgar_data_url, params[0])
            }
            UrlType::FilingContent => {
                let (cik, acc_no, filename) = (params[0], params[1], params[2]);
                let cik = cik.trim_start_matches('0');
                let formatted_acc = acc_no.replace('-', "");
                format!(
                    "{}/data/{}/{}/{}",
                    self.edgar_archives_url, cik, formatted_acc, filename
                )
            }
        }
    }
}

fn apply_options(mut filings: Vec<DetailedFiling>, opts: Option<FilingOptions>) -> Vec<DetailedFiling> {
    let Some(opts) = opts else {
        return filings;
    };

    filings.retain(|filing| opts.matches_form(&filing.form));

    if let Some(offset) = opts.offset {
        filings = filings.into_iter().skip(offset).collect();
    }
    if let Some(limit) = opts.limit {
        filings.truncate(limit);
    }

    filings
}

/// Submission and document retrieval for the Edgar client.
///
/// Submissions come from `data.sec.gov`: one JSON document per company with the most
/// recent filings (up to roughly a thousand) inline and older filings split into
/// additional pages listed under `filings.files`. Documents come from the EDGAR archive.
#[async_trait]
impl FilingOperations for Edgar {
    /// Retrieves the submission document for a CIK.
    ///
    /// # Errors
    ///
    /// * `EdgarError::NotFound` - no submissions exist for the CIK
    /// * `EdgarError::JsonError` - the response is malformed
    async fn submissions(&self, cik: &str) -> Result<Submission> {
        let url = self.build_url(UrlType::Submission, &[cik]);
        self.get_json(&url).await
    }

    /// Returns the inline `recent` block of a company's submissions as filing rows.
    async fn get_recent_filings(&self, cik: &str) -> Result<Vec<DetailedFiling>> {
        let submission = self.submissions(cik).await?;
        Ok(submission.filings.recent.to_filings())
    }

    /// Returns a company's complete filing history, newest page first.
    ///
    /// Fetches the submission document and then every older page it references.
    async fn filing_history(&self, cik: &str) -> Result<Vec<DetailedFiling>> {
        let submission = self.submissions(cik).await?;
        let mut filings = submission.filings.recent.to_filings();

        for file in &submission.filings.files {
            tracing::debug!(
                "Fetching submission page {} ({} filings, {} to {})",
                file.name,
                file.filing_count,
                file.filing_from,
                file.filing_to
            );
            let url = self.build_url(UrlType::SubmissionFile, &[&file.name]);
            let page: RecentFilings = self.get_json(&url).await?;
            filings.extend(page.to_filings());
        }

        Ok(filings)
    }

    /// Retrieves recent filings for a CIK, filtered by `opts`.
    ///
    /// Form filters are applied first, then `offset`, then `limit`.
    async fn filings(&self, cik: &str, opts: Option<FilingOptions>) -> Result<Vec<DetailedFiling>> {
        let filings = self.get_recent_filings(cik).await?;
        Ok(apply_options(filings, opts))
    }

    /// Builds the archive URL of a filing's primary document.
    ///
    /// # Errors
    ///
    /// Returns `EdgarError::InvalidResponse` if the filing has no primary document.
    fn primary_document_url(&self, cik: &str, filing: &DetailedFiling) -> Result<String> {
        let document = filing.primary_document.as_deref().ok_or_else(|| {
            EdgarError::InvalidResponse(format!(
                "No primary document for filing {}",
                filing.accession_number
            ))
        })?;
        Ok(self.build_url(
            UrlType::FilingContent,
            &[cik, &filing.accession_number, document],
        ))
    }

    /// Downloads a filing's primary document.
    async fn primary_document(&self, cik: &str, filing: &DetailedFiling) -> Result<String> {
        let url = self.primary_document_url(cik, filing)?;
        self.get(&url).await
    }
}
