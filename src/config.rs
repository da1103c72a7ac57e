use std::path::PathBuf;
use std::time::Duration;

use super::render::Format;
use super::selection::SelectionPolicy;

/// Configuration for the Edgar client
#[derive(Debug, Clone)]
pub struct EdgarConfig {
    /// User agent string for HTTP requests
    pub user_agent: String,
    /// Rate limit in requests per second
    pub rate_limit: u32,
    /// HTTP request timeout
    pub timeout: Duration,
    /// Base URLs for different EDGAR services
    pub base_urls: EdgarUrls,
}

/// Base URLs for different EDGAR services
#[derive(Debug, Clone)]
pub struct EdgarUrls {
    /// Base URL for EDGAR archives (filing documents)
    pub archives: String,
    /// Base URL for EDGAR data (submissions)
    pub data: String,
    /// Base URL for EDGAR files (ticker maps)
    pub files: String,
}

impl Default for EdgarConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("edgardump/", env!("CARGO_PKG_VERSION")).to_string(),
            rate_limit: 10,
            timeout: Duration::from_secs(30),
            base_urls: EdgarUrls::default(),
        }
    }
}

impl EdgarConfig {
    /// Creates a new EdgarConfig with custom settings
    ///
    /// # Basic usage
    ///
    /// ```rust
    /// use edgardump::{Edgar, EdgarConfig};
    /// use std::time::Duration;
    ///
    /// let config = EdgarConfig::new("YourAppName contact@example.com", 5, Duration::from_secs(60), None);
    /// let edgar = Edgar::with_config(config)?;
    /// # Ok::<(), edgardump::EdgarError>(())
    /// ```
    pub fn new(
        user_agent: impl Into<String>,
        rate_limit: u32,
        timeout: Duration,
        base_urls: Option<EdgarUrls>,
    ) -> Self {
        Self {
            user_agent: user_agent.into(),
            rate_limit,
            timeout,
            base_urls: base_urls.unwrap_or_default(),
        }
    }
}

impl Default for EdgarUrls {
    fn default() -> Self {
        Self {
            archives: "https://www.sec.gov/Archives/edgar".to_string(),
            data: "https://data.sec.gov".to_string(),
            files: "https://www.sec.gov/files".to_string(),
        }
    }
}

/// Settings for a single export run.
///
/// Controls where output lands, which textual formats are persisted, which filings are
/// selected and which bundle artifacts are attempted.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Existing directory under which the per-company directory is created
    pub output_root: PathBuf,
    /// Formats written to disk for every selected filing
    pub formats: Vec<Format>,
    /// Which filings to export
    pub policy: SelectionPolicy,
    /// Build a multi-chapter EPUB from the HTML renderings
    pub epub: bool,
    /// Render one PDF per HTML rendering
    pub pdf: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("."),
            formats: vec![Format::Html, Format::Markdown, Format::Text],
            policy: SelectionPolicy::default(),
            epub: true,
            pdf: true,
        }
    }
}

impl ExportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }

    pub fn with_formats(mut self, formats: Vec<Format>) -> Self {
        self.formats = formats;
        self
    }

    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_epub(mut self, enabled: bool) -> Self {
        self.epub = enabled;
        self
    }

    pub fn with_pdf(mut self, enabled: bool) -> Self {
        self.pdf = enabled;
        self
    }

    /// Whether HTML has to be rendered even if it is not persisted.
    pub(crate) fn needs_html(&self) -> bool {
        self.epub || self.pdf || self.formats.contains(&Format::Html)
    }

    /// Formats to render per filing: the requested ones without duplicates, plus HTML
    /// when a bundle consumes it.
    pub(crate) fn render_formats(&self) -> Vec<Format> {
        let mut formats: Vec<Format> = Vec::with_capacity(Format::ALL.len());
        for format in &self.formats {
            if !formats.contains(format) {
                formats.push(*format);
            }
        }
        if self.needs_html() && !formats.contains(&Format::Html) {
            formats.push(Format::Html);
        }
        formats
    }
}
