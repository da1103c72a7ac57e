//! Company identity lookups.
//!
//! SEC publishes a single ticker map (`company_tickers.json`) that links every listed
//! ticker to a Central Index Key (CIK) and the registrant's name. Resolving the ticker
//! given on the command line into a [`Company`] is the first request of every export.

use super::CompanyOperations;
use super::Edgar;
use super::error::{EdgarError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mapping between a stock ticker symbol and a company CIK.
///
/// Companies with several share classes appear once per ticker, all pointing at the
/// same CIK.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompanyTicker {
    #[serde(rename = "cik_str")]
    pub cik: u64,
    pub ticker: String,
    pub title: String,
}

/// A registrant resolved from the ticker map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub cik: u64,
    pub name: String,
    /// All tickers listed for the CIK, primary ticker first.
    pub tickers: Vec<String>,
}

impl Company {
    pub fn new(cik: u64, name: impl Into<String>, tickers: Vec<String>) -> Self {
        Self {
            cik,
            name: name.into(),
            tickers,
        }
    }

    /// The first ticker SEC lists for this company, if any.
    pub fn primary_ticker(&self) -> Option<&str> {
        self.tickers.first().map(String::as_str)
    }

    /// Finds `ticker` in an ordered ticker list and gathers every ticker sharing its CIK.
    pub fn from_tickers(tickers: &[CompanyTicker], ticker: &str) -> Result<Self> {
        let wanted = ticker.trim().to_uppercase();
        let hit = tickers
            .iter()
            .find(|t| t.ticker.eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| EdgarError::TickerNotFound(wanted.clone()))?;

        let symbols = tickers
            .iter()
            .filter(|t| t.cik == hit.cik)
            .map(|t| t.ticker.to_uppercase())
            .collect();

        Ok(Self::new(hit.cik, hit.title.clone(), symbols))
    }
}

/// Parses `company_tickers.json`, preserving SEC's ordering.
///
/// The file is an object keyed by row number (`"0"`, `"1"`, ...). Row order matters:
/// a company's primary ticker is the first row carrying its CIK.
pub fn parse_company_tickers(content: &str) -> Result<Vec<CompanyTicker>> {
    let map: HashMap<String, CompanyTicker> = serde_json::from_str(content)?;
    let mut rows = map
        .into_iter()
        .map(|(key, ticker)| {
            key.parse::<usize>()
                .map(|idx| (idx, ticker))
                .map_err(|_| EdgarError::InvalidResponse(format!("Invalid ticker row key '{}'", key)))
        })
        .collect::<Result<Vec<_>>>()?;
    rows.sort_by_key(|(idx, _)| *idx);
    Ok(rows.into_iter().map(|(_, ticker)| ticker).collect())
}

impl Edgar {
    fn company_tickers_url(&self) -> String {
        format!("{}/company_tickers.json", self.edgar_files_url)
    }
}

#[async_trait]
impl CompanyOperations for Edgar {
    /// Retrieves the full ticker map in SEC order.
    async fn company_tickers(&self) -> Result<Vec<CompanyTicker>> {
        let response = self.get(&self.company_tickers_url()).await?;
        parse_company_tickers(&response)
    }

    /// Retrieves the CIK for a ticker symbol.
    ///
    /// # Errors
    ///
    /// Returns `EdgarError::TickerNotFound` if the ticker is not in the map.
    async fn company_cik(&self, ticker: &str) -> Result<u64> {
        Ok(self.company(ticker).await?.cik)
    }

    /// Resolves a ticker into a [`Company`] with all of its tickers.
    async fn company(&self, ticker: &str) -> Result<Company> {
        let tickers = self.company_tickers().await?;
        Company::from_tickers(&tickers, ticker)
    }
}
