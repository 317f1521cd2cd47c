use thiserror::Error;

/// A ticket string that does not normalize to `(series, number)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TicketError {
    #[error("ticket is empty")]
    Empty,

    #[error("ticket '{0}' must be up to two letters followed by digits")]
    Malformed(String),
}

/// Rejection of a caller-supplied query before matching.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("invalid ticket format: {0}")]
    Format(#[from] TicketError),

    #[error("ticket number has {len} digits, expected {min} to {max}")]
    Length { len: usize, min: usize, max: usize },
}

impl QueryError {
    /// Short machine-readable reason for the query surface.
    pub fn reason(&self) -> &'static str {
        match self {
            QueryError::Format(_) => "format",
            QueryError::Length { .. } => "length",
        }
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("invalid amount pattern for '{name}': {source}")]
    AmountPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("amount pattern for '{0}' has no capture group for the digits")]
    MissingAmountGroup(String),

    #[error("category '{0}' has no marker phrases")]
    NoMarkers(String),
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("no prize categories could be extracted for {lottery} on {date}")]
    NoCategories { lottery: String, date: String },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error("digit limits are inverted: min {min} > max {max}")]
    InvertedLimits { min: usize, max: usize },
}
