use thiserror::Error;

#[derive(Error, Debug)]
pub enum EdgarError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Resource not found")]
    NotFound,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Ticker not found: {0}")]
    TickerNotFound(String),

    #[error("No {0} filings on record")]
    MissingForm(String),

    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to render {format}: {reason}")]
    RenderError { format: String, reason: String },

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("EPUB error: {0}")]
    EpubError(String),

    #[error("PDF error: {0}")]
    PdfError(String),

    #[error(
        "Unexpected content type from URL {url}. Expected pattern {expected_pattern}, but got Content-Type: {got_content_type}. Content preview: {content_preview}..."
    )]
    UnexpectedContentType {
        url: String,
        expected_pattern: String,
        got_content_type: String,
        content_preview: String,
    },
}

#[cfg(feature = "epub")]
impl From<zip::result::ZipError> for EdgarError {
    fn from(error: zip::result::ZipError) -> Self {
        EdgarError::EpubError(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EdgarError>;
