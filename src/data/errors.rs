use thiserror::Error;

/// Error types for data and generation operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("API error: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("No data available for {symbol} between {start} and {end}")]
    NoData {
        symbol: String,
        start: String,
        end: String,
    },

    #[error("Feed error: {0}")]
    Feed(#[from] rss::Error),

    #[error("All news sources failed; {primary_source}: {primary_cause}; {fallback_source}: {fallback_cause}")]
    SourcesExhausted {
        primary_source: &'static str,
        primary_cause: Box<DataError>,
        fallback_source: &'static str,
        fallback_cause: Box<DataError>,
    },

    #[error("Data validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for data operations
pub type DataResult<T> = Result<T, DataError>;

impl DataError {
    /// Whether a news-primary failure of this kind is eligible for the
    /// keyless feed fallback. Anything else (e.g. an invalid query)
    /// is a caller bug and surfaces immediately.
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(
            self,
            DataError::Network(_)
                | DataError::Api { .. }
                | DataError::Parse { .. }
                | DataError::Serialization(_)
                | DataError::Config(_)
        )
    }

    /// Create a parse error with context
    pub fn parse_error<S: Into<String>>(message: S) -> Self {
        DataError::Parse {
            message: message.into(),
        }
    }

    /// Create a validation error with field context
    pub fn validation_error<S: Into<String>>(field: S, message: S) -> Self {
        DataError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an API error with status code
    pub fn api_error<S: Into<String>>(status_code: u16, message: S) -> Self {
        DataError::Api {
            status_code,
            message: message.into(),
        }
    }
}
