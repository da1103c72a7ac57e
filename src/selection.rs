//! Narrowing a company's filing history down to the documents worth exporting.
//!
//! The default policy picks the four most recent quarterly reports (10-Q), the most
//! recent annual report (10-K) and the company's original registration statement (S-1).

use std::cmp::Ordering;

use super::error::{EdgarError, Result};
use super::filings::DetailedFiling;
use super::options::FilingOptions;

/// What to do when the annual or prospectus form has no filing on record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingFormPolicy {
    /// Abort the selection with `EdgarError::MissingForm`.
    #[default]
    Fail,
    /// Log a warning and leave the slot out.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPolicy {
    pub quarterly_form: String,
    pub quarterly_count: usize,
    pub annual_form: String,
    pub prospectus_form: String,
    pub missing: MissingFormPolicy,
    pub include_amendments: bool,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            quarterly_form: "10-Q".to_string(),
            quarterly_count: 4,
            annual_form: "10-K".to_string(),
            prospectus_form: "S-1".to_string(),
            missing: MissingFormPolicy::Fail,
            include_amendments: false,
        }
    }
}

/// Newest first: filing date, then acceptance time.
fn newest_first(a: &DetailedFiling, b: &DetailedFiling) -> Ordering {
    b.filed_on()
        .cmp(&a.filed_on())
        .then_with(|| b.acceptance_date_time.cmp(&a.acceptance_date_time))
}

impl SelectionPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quarterly_count(mut self, count: usize) -> Self {
        self.quarterly_count = count;
        self
    }

    pub fn with_missing(mut self, missing: MissingFormPolicy) -> Self {
        self.missing = missing;
        self
    }

    pub fn with_include_amendments(mut self, include_amendments: bool) -> Self {
        self.include_amendments = include_amendments;
        self
    }

    pub fn with_forms(
        mut self,
        quarterly: impl Into<String>,
        annual: impl Into<String>,
        prospectus: impl Into<String>,
    ) -> Self {
        self.quarterly_form = quarterly.into();
        self.annual_form = annual.into();
        self.prospectus_form = prospectus.into();
        self
    }

    /// All filings of `form`, newest first.
    fn of_form(&self, filings: &[DetailedFiling], form: &str) -> Vec<DetailedFiling> {
        let opts = FilingOptions::new()
            .with_form_type(form)
            .with_include_amendments(self.include_amendments);
        let mut matching: Vec<DetailedFiling> = filings
            .iter()
            .filter(|filing| opts.matches_form(&filing.form))
            .cloned()
            .collect();
        matching.sort_by(newest_first);
        matching
    }

    fn required(&self, found: Option<DetailedFiling>, form: &str) -> Result<Option<DetailedFiling>> {
        match (found, self.missing) {
            (Some(filing), _) => Ok(Some(filing)),
            (None, MissingFormPolicy::Fail) => Err(EdgarError::MissingForm(form.to_string())),
            (None, MissingFormPolicy::Skip) => {
                tracing::warn!("No {} filings on record, skipping", form);
                Ok(None)
            }
        }
    }

    /// Applies the policy to a company's filing history.
    ///
    /// Returns the latest quarterly filings (newest first), then the latest annual
    /// filing, then the earliest prospectus. Fewer quarterly filings than requested is
    /// not an error.
    ///
    /// # Errors
    ///
    /// `EdgarError::MissingForm` when the annual or prospectus form is absent and the
    /// policy is [`MissingFormPolicy::Fail`].
    pub fn select(&self, filings: &[DetailedFiling]) -> Result<Vec<DetailedFiling>> {
        let mut selected: Vec<DetailedFiling> = self
            .of_form(filings, &self.quarterly_form)
            .into_iter()
            .take(self.quarterly_count)
            .collect();

        if selected.len() < self.quarterly_count {
            tracing::warn!(
                "Only {} of {} requested {} filings on record",
                selected.len(),
                self.quarterly_count,
                self.quarterly_form
            );
        }

        let annual = self.of_form(filings, &self.annual_form).into_iter().next();
        selected.extend(self.required(annual, &self.annual_form)?);

        let prospectus = self.of_form(filings, &self.prospectus_form).pop();
        selected.extend(self.required(prospectus, &self.prospectus_form)?);

        tracing::debug!("Selected {} of {} filings", selected.len(), filings.len());
        Ok(selected)
    }
}
