use std::path::PathBuf;
use thiserror::Error;

/// Everything that can abort a pipeline run. Each variant names the failing
/// stage's offending input so a truncated run is diagnosable from the message
/// alone.
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("source document unavailable at {url}: {reason}")]
    SourceUnavailable { url: String, reason: String },

    #[error("source document at {url} contains no tables")]
    NoTablesFound { url: String },

    #[error("table index {index} out of range: the document has {count} table(s)")]
    TableIndexOutOfRange { index: usize, count: usize },

    #[error("no table header matched \"{pattern}\"")]
    TableNotMatched { pattern: String },

    #[error("column \"{column}\" not found in the selected table header")]
    ColumnNotFound { column: String },

    #[error("malformed market cap at row {row}: {raw:?}")]
    MalformedMarketCap { row: usize, raw: String },

    #[error("exchange rate file {} unreadable: {reason}", path.display())]
    RateFileUnreadable { path: PathBuf, reason: String },

    #[error("duplicate currency code \"{code}\" in exchange rate file")]
    DuplicateCurrency { code: String },

    #[error("invalid rate {raw:?} for currency \"{code}\": must be a positive number")]
    InvalidRate { code: String, raw: String },

    #[error("missing exchange rate for required currency \"{code}\"")]
    MissingRate { code: String },

    #[error("failed to write sink {}: {reason}", path.display())]
    SinkWriteError { path: PathBuf, reason: String },

    #[error("failed to open relational sink {}: {source}", path.display())]
    SinkConnectionError {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("query failed: {sql}: {source}")]
    QueryExecutionError {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, EtlError>;
