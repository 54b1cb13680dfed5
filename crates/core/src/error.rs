//! Error types for slide-deck translation and font substitution.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors that abort a whole deck operation.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The input bytes are not an openable container.
    #[error("Not a valid .pptx file: {0}")]
    Format(String),

    /// A requested part does not exist in the archive.
    #[error("Part not found in archive: {0}")]
    PartNotFound(String),

    /// The archive holds no slide parts.
    #[error("No slide files found, the presentation structure may be non-standard")]
    NoSlidesFound,

    /// No slide carries any text, e.g. an image-only deck.
    #[error("No text content found in the slides, the deck may contain only images")]
    NoTextFound,

    /// A part's XML could not be parsed.
    #[error("XML parsing error: {0}")]
    Xml(String),

    /// Mutated XML or the output container could not be written.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The caller cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,

    /// The configuration file could not be loaded.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Failure of a single translate call.
///
/// These never abort a deck: the orchestrator logs them and keeps the
/// source text for the affected paragraph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslateError {
    /// The request could not be sent or the connection failed.
    #[error("API request failed: {0}")]
    Request(String),

    /// The provider answered with a non-success status.
    #[error("API responded with error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// The provider kept rejecting requests for rate-limit reasons.
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// The provider response could not be interpreted.
    #[error("Failed to parse API response: {0}")]
    Parse(String),

    /// Any other failure reported by a translator.
    #[error("{0}")]
    Other(String),
}

impl TranslateError {
    /// Whether retrying the same request later could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(_) | Self::RateLimited(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Parse(_) | Self::Other(_) => false,
        }
    }
}
