//! Job scheduling and execution
//!
//! The scheduler turns the filtered catalog into an explicit set of work
//! units before anything runs: one (data type, field kind) job per flag in
//! serial mode, one job per partition in parallel mode (sized by a count
//! phase). Serial runs execute in catalog order and abort on the first
//! failure; parallel runs spawn every unit on a `JoinSet`, wait for all of
//! them, and collect failures per unit without cancelling siblings.
//!
//! Concurrent workers may interleave writes to a shared collection; that is
//! safe because every upsert touches only its own field group with
//! replace/union semantics.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use tokio::task::JoinSet;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::catalog::{DataType, FieldKind};
use crate::client::SparqlClient;
use crate::config::UpdateContext;
use crate::error::UpdateError;
use crate::job::{JobOutcome, RowWindow, UpdateJob};
use crate::store::DocumentStore;

/// One finished work unit
#[derive(Debug, Clone)]
pub struct UnitReport {
    pub graph: String,
    pub field: &'static str,
    pub offset: Option<u64>,
    pub rows: u64,
    pub elapsed: Duration,
}

/// One failed work unit
#[derive(Debug)]
pub struct UnitFailure {
    pub graph: String,
    pub field: &'static str,
    pub offset: Option<u64>,
    pub error: UpdateError,
}

impl std::fmt::Display for UnitFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.offset {
            Some(offset) => write!(
                f,
                "{} {} batch at offset {offset} failed: {}",
                self.graph, self.field, self.error
            ),
            None => write!(f, "{} {} failed: {}", self.graph, self.field, self.error),
        }
    }
}

/// Aggregate outcome of one scheduler run
#[derive(Debug, Default)]
pub struct RunReport {
    pub completed: Vec<UnitReport>,
    pub failures: Vec<UnitFailure>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn total_rows(&self) -> u64 {
        self.completed.iter().map(|unit| unit.rows).sum()
    }
}

/// Runs the full set of update jobs for one catalog
pub struct Scheduler {
    client: SparqlClient,
    store: Arc<dyn DocumentStore>,
    context: UpdateContext,
}

impl Scheduler {
    pub fn new(client: SparqlClient, store: Arc<dyn DocumentStore>, context: UpdateContext) -> Self {
        Self {
            client,
            store,
            context,
        }
    }

    /// The (data type, field kind) jobs a catalog schedules, in catalog
    /// order. Labels always bring synonyms with them.
    pub fn plan(catalog: &[DataType]) -> Vec<(DataType, FieldKind)> {
        catalog
            .iter()
            .flat_map(|data_type| {
                data_type
                    .scheduled_kinds()
                    .into_iter()
                    .map(move |kind| (data_type.clone(), kind))
            })
            .collect()
    }

    /// Split `[0, total)` into batch windows of at most `batch_size` rows.
    ///
    /// Partitions cover the range exactly once: `ceil(total / batch_size)`
    /// windows, no gaps, no overlaps.
    pub fn partitions(total: u64, batch_size: u64) -> Vec<(u64, u64)> {
        debug_assert!(batch_size > 0);
        let mut windows = Vec::new();
        let mut offset = 0;
        while offset < total {
            windows.push((offset, batch_size.min(total - offset)));
            offset += batch_size;
        }
        windows
    }

    /// Run every scheduled job. Wipes target collections first if requested;
    /// the wipe completes fully before any job starts.
    pub async fn run(&self, catalog: &[DataType]) -> anyhow::Result<RunReport> {
        let started = Instant::now();

        if self.context.wipe_data {
            self.wipe_collections(catalog).await?;
        }

        let planned = Self::plan(catalog);
        info!(
            "Scheduling {} update jobs across {} data types",
            planned.len(),
            catalog.len()
        );

        if self.context.parallel {
            self.run_parallel(planned, started).await
        } else {
            self.run_serial(planned, started).await
        }
    }

    async fn wipe_collections(&self, catalog: &[DataType]) -> anyhow::Result<()> {
        for data_type in catalog {
            for collection in &data_type.collections {
                info!("Wiping collection: {}", collection.name);
                let removed = self
                    .store
                    .wipe(&collection.name)
                    .await
                    .with_context(|| format!("failed to wipe collection {}", collection.name))?;
                debug!("Removed {removed} documents from {}", collection.name);
            }
        }
        Ok(())
    }

    async fn run_serial(
        &self,
        planned: Vec<(DataType, FieldKind)>,
        started: Instant,
    ) -> anyhow::Result<RunReport> {
        let mut completed = Vec::new();

        for (data_type, kind) in planned {
            let job = UpdateJob::new(
                self.client.clone(),
                self.store.clone(),
                data_type.clone(),
                kind,
            );
            let outcome = job
                .run(RowWindow::Full {
                    limit: self.context.limit,
                })
                .await
                .with_context(|| format!("{} {} update failed", data_type.graph, kind))?;

            completed.push(UnitReport {
                graph: data_type.graph,
                field: kind.name(),
                offset: None,
                rows: outcome.rows,
                elapsed: outcome.elapsed,
            });
        }

        Ok(RunReport {
            completed,
            failures: Vec::new(),
            elapsed: started.elapsed(),
        })
    }

    async fn run_parallel(
        &self,
        planned: Vec<(DataType, FieldKind)>,
        started: Instant,
    ) -> anyhow::Result<RunReport> {
        // Count phase: size every job's partitions before any worker starts
        let mut units = Vec::new();
        for (data_type, kind) in planned {
            let job = UpdateJob::new(
                self.client.clone(),
                self.store.clone(),
                data_type.clone(),
                kind,
            );
            let total = job
                .count_rows()
                .await
                .with_context(|| format!("count query for {} {} failed", data_type.graph, kind))?;

            let windows = Self::partitions(total, self.context.batch_size);
            info!(
                "{} {}: {total} rows in {} batches",
                data_type.graph,
                kind,
                windows.len()
            );
            for (offset, size) in windows {
                units.push((data_type.clone(), kind, offset, size));
            }
        }

        info!("Starting {} workers...", units.len());

        type WorkerResult = (String, &'static str, u64, Result<JobOutcome, UpdateError>);
        let mut workers: JoinSet<WorkerResult> = JoinSet::new();
        for (data_type, kind, offset, size) in units {
            let client = self.client.clone();
            let store = self.store.clone();
            let worker_id = Uuid::new_v4();
            workers.spawn(async move {
                debug!(
                    worker_id = %worker_id,
                    graph = %data_type.graph,
                    field = %kind,
                    offset,
                    "Worker started"
                );
                let graph = data_type.graph.clone();
                let job = UpdateJob::new(client, store, data_type, kind);
                let result = job.run(RowWindow::Batch { offset, size }).await;
                (graph, kind.name(), offset, result)
            });
        }

        let mut completed = Vec::new();
        let mut failures = Vec::new();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((graph, field, offset, Ok(outcome))) => {
                    completed.push(UnitReport {
                        graph,
                        field,
                        offset: Some(offset),
                        rows: outcome.rows,
                        elapsed: outcome.elapsed,
                    });
                }
                Ok((graph, field, offset, Err(error))) => {
                    let failure = UnitFailure {
                        graph,
                        field,
                        offset: Some(offset),
                        error,
                    };
                    error!("{failure}");
                    failures.push(failure);
                }
                Err(join_error) => {
                    let failure = UnitFailure {
                        graph: "<worker>".to_string(),
                        field: "unknown",
                        offset: None,
                        error: UpdateError::Worker(join_error.to_string()),
                    };
                    error!("{failure}");
                    failures.push(failure);
                }
            }
        }

        Ok(RunReport {
            completed,
            failures,
            elapsed: started.elapsed(),
        })
    }
}
