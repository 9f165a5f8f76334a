//! The parameterized update job
//!
//! One job body serves every (data type, field type) pair: open a row
//! stream over the job's window, project each row, fan the update out to
//! every target collection, and report rows and elapsed time. The count
//! phase used by the batching planner is a separate operation that never
//! touches the store.
//!
//! Any transport, decode or upsert failure terminates the job. Re-running
//! the same job is the retry mechanism; upserts are idempotent.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::info;

use bgw_common::format_duration;

use crate::catalog::{DataType, FieldKind};
use crate::client::SparqlClient;
use crate::error::Result;
use crate::projection;
use crate::store::DocumentStore;

/// Progress is logged every this many rows
pub const PROGRESS_INTERVAL: u64 = 10_000;

/// Row window one job run streams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowWindow {
    /// The whole result set, optionally capped to a hard row limit
    Full { limit: Option<u64> },
    /// One partition `[offset, offset + size)` of a batched result set
    Batch { offset: u64, size: u64 },
}

/// What one job run produced
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub rows: u64,
    pub elapsed: Duration,
}

/// One (data type, field type) update job
pub struct UpdateJob {
    client: SparqlClient,
    store: Arc<dyn DocumentStore>,
    data_type: DataType,
    kind: FieldKind,
}

impl UpdateJob {
    pub fn new(
        client: SparqlClient,
        store: Arc<dyn DocumentStore>,
        data_type: DataType,
        kind: FieldKind,
    ) -> Self {
        Self {
            client,
            store,
            data_type,
            kind,
        }
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Count phase: total rows this job's query would stream.
    pub async fn count_rows(&self) -> Result<u64> {
        let query = self.kind.query(&self.data_type);
        self.client.fetch_count(&query).await
    }

    /// Streaming phase: pull rows, project, upsert, log progress.
    ///
    /// Progress counters are offset by the batch's starting offset so log
    /// lines reflect absolute positions in the full result set.
    pub async fn run(&self, window: RowWindow) -> Result<JobOutcome> {
        let started = Instant::now();
        let graph = &self.data_type.graph;

        let (limit, offset) = match window {
            RowWindow::Full { limit } => {
                info!("Downloading {} data for {graph}", self.kind);
                (limit, None)
            }
            RowWindow::Batch { offset, size } => {
                info!(
                    "Downloading {} data for {graph} in {size} row chunks, offset {offset}",
                    self.kind
                );
                (Some(size), Some(offset))
            }
        };

        let mut rows = self.client.open_rows(&self.kind.query(&self.data_type), limit, offset).await?;

        let base = offset.unwrap_or(0);
        let mut count: u64 = 0;
        while let Some(row) = rows.next_row().await {
            let row = row?;
            if count % PROGRESS_INTERVAL == 0 {
                info!("{graph} updated {} row {}", self.kind, base + count);
            }
            for collection in &self.data_type.collections {
                let (entity_id, update) = projection::project(self.kind, &row, collection)?;
                self.store
                    .upsert(&collection.name, &entity_id, &update)
                    .await?;
            }
            count += 1;
        }

        let elapsed = started.elapsed();
        info!(
            "Updated {count} {graph} {} in {}",
            self.kind,
            format_duration(elapsed)
        );

        Ok(JobOutcome {
            rows: count,
            elapsed,
        })
    }
}
