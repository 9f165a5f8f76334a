//! SPARQL endpoint client
//!
//! Streams tab-separated result sets line-by-line instead of buffering whole
//! responses: result sets here run to millions of rows. The first response
//! line is the column header and is always discarded. A [`RowStream`] is not
//! restartable; reopening means a fresh request.

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use tokio::io::{AsyncBufReadExt, Lines};
use tokio_util::io::StreamReader;

use crate::error::{DecodeError, Result, TransportError};
use crate::queries;

type BodyReader = StreamReader<BoxStream<'static, std::io::Result<Bytes>>, Bytes>;

/// One decoded data row: tab-split, quote-stripped, newline-stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    columns: Vec<String>,
}

impl Row {
    /// Decode one response line.
    pub fn parse(line: &str) -> Self {
        let columns = line
            .trim_end_matches(['\n', '\r'])
            .replace('"', "")
            .split('\t')
            .map(str::to_string)
            .collect();
        Self { columns }
    }

    pub fn column(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Lazily decoded stream of data rows from one query response
pub struct RowStream {
    lines: Lines<BodyReader>,
    header_skipped: bool,
}

impl std::fmt::Debug for RowStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowStream")
            .field("header_skipped", &self.header_skipped)
            .finish_non_exhaustive()
    }
}

impl RowStream {
    /// Next data row, or `None` once the response is exhausted.
    ///
    /// Skips the header line and any blank trailing lines.
    pub async fn next_row(&mut self) -> Option<std::result::Result<Row, TransportError>> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) => {
                    if !self.header_skipped {
                        self.header_skipped = true;
                        continue;
                    }
                    if line.trim().is_empty() {
                        continue;
                    }
                    return Some(Ok(Row::parse(&line)));
                }
                Ok(None) => return None,
                Err(e) => return Some(Err(TransportError::Stream(e))),
            }
        }
    }
}

/// Client for one SPARQL endpoint
#[derive(Debug, Clone)]
pub struct SparqlClient {
    http: reqwest::Client,
    base_url: String,
}

impl SparqlClient {
    /// Create a client for the endpoint at `base_url` (`hostname:port`).
    ///
    /// No overall request timeout is set: streaming a full result set can
    /// legitimately take hours. Connection establishment is bounded.
    pub fn new(base_url: impl Into<String>) -> std::result::Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(30))
            .user_agent("bgw-cache-updater/0.1")
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Open a streaming row window over `query`.
    ///
    /// Absent `limit` means no limit (whole result set). Connection failures
    /// and non-success statuses surface here; malformed rows surface later,
    /// at projection time.
    pub async fn open_rows(
        &self,
        query: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> std::result::Result<RowStream, TransportError> {
        let url = queries::endpoint_url(&self.base_url, query, limit, offset);
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status { status, url });
        }

        let stream = response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
            .boxed();

        Ok(RowStream {
            lines: StreamReader::new(stream).lines(),
            header_skipped: false,
        })
    }

    /// Fetch the total row count for `query` via its count-only variant.
    pub async fn fetch_count(&self, query: &str) -> Result<u64> {
        let count_query = queries::count_query(query);
        let mut rows = self.open_rows(&count_query, None, None).await?;

        match rows.next_row().await {
            Some(row) => {
                let row = row?;
                let value = row.column(0).unwrap_or("");
                value.parse::<u64>().map_err(|_| {
                    DecodeError::Integer {
                        field: "count",
                        column: 0,
                        value: value.to_string(),
                    }
                    .into()
                })
            }
            None => Err(DecodeError::MissingCount.into()),
        }
    }
}
