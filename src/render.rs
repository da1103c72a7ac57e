//! Textual renderings of a filing's primary document.

use std::fmt;
use std::str::FromStr;

use super::error::{EdgarError, Result};
use super::traits::Filing;

/// A textual output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Html,
    Markdown,
    Text,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Html, Format::Markdown, Format::Text];

    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Html => "html",
            Format::Markdown => "md",
            Format::Text => "txt",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Html => "HTML",
            Format::Markdown => "Markdown",
            Format::Text => "text",
        };
        f.write_str(name)
    }
}

impl FromStr for Format {
    type Err = EdgarError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" | "htm" => Ok(Format::Html),
            "md" | "markdown" => Ok(Format::Markdown),
            "txt" | "text" => Ok(Format::Text),
            other => Err(EdgarError::ConfigError(format!(
                "Unknown format '{}' (expected html, md or txt)",
                other
            ))),
        }
    }
}

/// One filing rendered in one format, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendering {
    pub content: String,
    pub form: String,
    pub filing_date: String,
    pub format: Format,
    pub filename: String,
}

impl Rendering {
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Converts an HTML document into `format`.
///
/// HTML passes through untouched. Markdown and text conversions are cargo features;
/// when one is compiled out its format reports `EdgarError::BackendUnavailable`.
pub fn convert_html(html: &str, format: Format, text_width: usize) -> Result<String> {
    match format {
        Format::Html => Ok(html.to_string()),
        Format::Markdown => html_to_markdown(html),
        Format::Text => html_to_text(html, text_width),
    }
}

#[cfg(feature = "markdown")]
fn html_to_markdown(html: &str) -> Result<String> {
    html_to_markdown_rs::convert(html, None).map_err(|e| EdgarError::RenderError {
        format: Format::Markdown.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(not(feature = "markdown"))]
fn html_to_markdown(_html: &str) -> Result<String> {
    Err(EdgarError::BackendUnavailable(
        "Markdown conversion (built without the `markdown` feature)".to_string(),
    ))
}

#[cfg(feature = "text")]
fn html_to_text(html: &str, width: usize) -> Result<String> {
    if width == 0 {
        return Err(EdgarError::ConfigError(
            "Text width must be greater than zero".to_string(),
        ));
    }
    Ok(html2text::from_read(html.as_bytes(), width))
}

#[cfg(not(feature = "text"))]
fn html_to_text(_html: &str, _width: usize) -> Result<String> {
    Err(EdgarError::BackendUnavailable(
        "text conversion (built without the `text` feature)".to_string(),
    ))
}

/// A filing backed by its downloaded primary HTML document.
#[derive(Debug, Clone)]
pub struct HtmlFiling {
    form: String,
    filing_date: String,
    html: String,
    text_width: usize,
}

impl HtmlFiling {
    pub fn new(
        form: impl Into<String>,
        filing_date: impl Into<String>,
        html: impl Into<String>,
    ) -> Self {
        Self {
            form: form.into(),
            filing_date: filing_date.into(),
            html: html.into(),
            text_width: 100,
        }
    }

    pub fn with_text_width(mut self, width: usize) -> Self {
        self.text_width = width;
        self
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

impl Filing for HtmlFiling {
    fn form(&self) -> &str {
        &self.form
    }

    fn filing_date(&self) -> &str {
        &self.filing_date
    }

    fn render(&self, format: Format) -> Result<String> {
        convert_html(&self.html, format, self.text_width)
    }
}
