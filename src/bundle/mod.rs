//! Bundle artifacts built from a run's HTML renderings: one EPUB for the whole
//! company and one PDF per filing.

#[cfg(feature = "epub")]
pub mod epub;
pub mod pdf;

#[cfg(feature = "epub")]
pub use epub::{EpubBuilder, EpubMetadata, to_xhtml_body};
pub use pdf::{CommandPdfRenderer, DEFAULT_PDF_COMMAND};

use super::company::Company;
use super::error::Result;
use super::render::Rendering;

/// `{ticker}_filings.epub`
pub fn epub_filename(ticker: &str) -> String {
    format!("{}_filings.epub", ticker)
}

/// `{form} - {filing_date}`
pub fn chapter_title(form: &str, filing_date: &str) -> String {
    format!("{} - {}", form, filing_date)
}

/// Packs the non-empty HTML renderings into one EPUB, in the order given.
///
/// Returns `None` when no rendering produced a chapter.
#[cfg(feature = "epub")]
pub fn build_epub(
    company: &Company,
    ticker: &str,
    renderings: &[Rendering],
) -> Result<Option<Vec<u8>>> {
    let metadata = EpubMetadata::new(
        format!("{}_{}", ticker, company.cik),
        format!("{} SEC Filings", company.name),
    );
    let mut builder = EpubBuilder::new(metadata);
    for rendering in renderings {
        if !builder.add_chapter(
            chapter_title(&rendering.form, &rendering.filing_date),
            &rendering.content,
        ) {
            tracing::debug!(
                "Skipping empty chapter {} {}",
                rendering.form,
                rendering.filing_date
            );
        }
    }
    builder.build()
}

#[cfg(not(feature = "epub"))]
pub fn build_epub(
    _company: &Company,
    _ticker: &str,
    _renderings: &[Rendering],
) -> Result<Option<Vec<u8>>> {
    Err(super::error::EdgarError::BackendUnavailable(
        "EPUB output (built without the `epub` feature)".to_string(),
    ))
}
