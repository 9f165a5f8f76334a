//! Error types for the cache updater
//!
//! Three failure classes exist, mirroring the pipeline stages: transport
//! (reaching the SPARQL endpoint and reading its stream), decode (projecting
//! a tab-separated row), and upsert (writing to the document store). All
//! three are fatal to the update job they occur in; retry means re-running
//! the job, which is safe because upserts are idempotent.

use thiserror::Error;

/// Result type alias for updater operations
pub type Result<T> = std::result::Result<T, UpdateError>;

/// Umbrella error for a single update job
#[derive(Error, Debug)]
pub enum UpdateError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Upsert(#[from] UpsertError),

    /// A parallel worker task aborted before producing a result
    #[error("worker task failed: {0}")]
    Worker(String),
}

/// Failures reaching the endpoint or reading its response stream
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request to SPARQL endpoint failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("SPARQL endpoint returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("response stream failed: {0}")]
    Stream(#[from] std::io::Error),
}

/// A row that does not match the column layout its handler expects
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("{field} row has {got} columns, needs at least {expected}")]
    ColumnCount {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{field} column {column} is not an integer: {value:?}")]
    Integer {
        field: &'static str,
        column: usize,
        value: String,
    },

    #[error("count query returned no data row")]
    MissingCount,
}

/// The document store rejected a write
#[derive(Error, Debug)]
pub enum UpsertError {
    #[error("document store write failed: {0}")]
    Driver(#[from] mongodb::error::Error),
}
