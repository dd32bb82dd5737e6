#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
    #[error("environment variable {key} is not a valid url")]
    InvalidUrl {
        key: &'static str,
        #[source]
        source: url::ParseError,
    },
}

/// Why an event feed response could not be turned into a dated record.
#[derive(thiserror::Error, Debug)]
pub enum RecordError {
    #[error("event feed returned an empty body, no matching events")]
    EmptyFeed,
    #[error("event feed rejected the access token ({detail}), need to refresh token")]
    Unauthorized { detail: String },
    #[error("event feed response has no _embedded field")]
    MissingEmbedded,
    #[error("event feed response is not valid json")]
    Malformed(#[source] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum LocateError {
    #[error("last cell of column A (row {row}) is empty")]
    EmptyCell { row: usize },
    #[error("last cell of column A (row {row}) is not a dated record")]
    Undecodable {
        row: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("last cell of column A (row {row}) has an out of range date {date}")]
    InvalidDate { row: usize, date: f64 },
}
