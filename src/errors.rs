/*!
 * Error types for the xliffai application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors that can occur while reading, splitting or writing XLIFF documents
#[derive(Error, Debug)]
pub enum XliffError {
    /// The root element carries no version, or one we cannot handle
    #[error("Unsupported XLIFF version: {}", .0.as_deref().unwrap_or("<missing>"))]
    UnsupportedVersion(Option<String>),

    /// The document is not well-formed XML
    #[error("XML parse error at byte {position}: {message}")]
    Parse {
        /// Byte offset reported by the reader
        position: usize,
        /// Reader error message
        message: String,
    },

    /// The document is well-formed but not shaped like XLIFF
    #[error("Malformed XLIFF structure: {0}")]
    Structure(String),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error with the document itself
    #[error("XLIFF error: {0}")]
    Xliff(#[from] XliffError),

    /// The backend returned a different number of bracketed entries than were sent
    #[error("Response contains {found} translated entries, expected {expected}")]
    ResponseCountMismatch {
        /// Number of unique strings sent
        expected: usize,
        /// Number of bracketed entries found in the response
        found: usize,
    },

    /// The backend numbered its entries in a way that does not match the request
    #[error("Response entry index {index} is out of range or duplicated (1..={expected})")]
    ResponseIndexMismatch {
        /// Offending index
        index: usize,
        /// Number of unique strings sent
        expected: usize,
    },

    /// A source string cannot be sent inside the bracketed entry format
    #[error("Source text '{0}' contains ']]' at a line end and cannot be sent as one entry")]
    UnframeableEntry(String),

    /// A translatable string has no entry in the translation map
    #[error("No translation available for source text '{0}'")]
    MissingTranslation(String),

    /// The reinserter needed more replacement strings than it was given
    #[error("Text position {position} has no replacement ({available} available)")]
    ReinsertionCursorOverflow {
        /// Zero-based text position that could not be filled
        position: usize,
        /// Number of replacement strings available
        available: usize,
    },

    /// The reinserter finished with replacement strings left over
    #[error("Reinsertion consumed {consumed} of {available} replacement strings")]
    ReinsertionLengthMismatch {
        /// Number of replacement strings consumed
        consumed: usize,
        /// Number of replacement strings available
        available: usize,
    },

    /// A translated cluster did not contain the unit blocks it was built from
    #[error("Cluster {cluster}: expected {expected} unit blocks in translated fragment, found {found}")]
    FragmentExtractionMismatch {
        /// Zero-based cluster index
        cluster: usize,
        /// Number of unit blocks sent
        expected: usize,
        /// Number of unit blocks found
        found: usize,
    },

    /// Failure while translating a specific cluster
    #[error("Cluster {cluster} failed: {source}")]
    Cluster {
        /// Zero-based cluster index
        cluster: usize,
        /// Underlying error
        #[source]
        source: Box<TranslationError>,
    },

    /// Failure in the string cache store
    #[error("Cache error: {0}")]
    Cache(String),
}

impl TranslationError {
    /// Attach the cluster index to an error raised while translating that cluster
    pub fn in_cluster(self, cluster: usize) -> Self {
        match self {
            Self::FragmentExtractionMismatch { .. } | Self::Cluster { .. } => self,
            other => Self::Cluster { cluster, source: Box::new(other) },
        }
    }
}
