//! BGW Updater
//!
//! Synchronization engine for the BioGateway metadata cache: streams
//! tab-separated result sets from a SPARQL endpoint and upserts derived
//! fields (labels, synonyms, scores, taxa, instances, annotation scores)
//! into MongoDB collections keyed by entity identifier.
//!
//! # Architecture
//!
//! - **catalog**: immutable data type catalog and CLI filtering
//! - **queries**: SPARQL query builders, count transformation, endpoint URL
//! - **client**: streaming row client over the endpoint
//! - **projection**: row-to-partial-update handlers per field type
//! - **store**: document store seam (MongoDB and in-memory implementations)
//! - **job**: the single parameterized update job (count + streaming phases)
//! - **scheduler**: serial/parallel execution over an explicit work-unit set
//! - **reset**: database drop and index recreation
//!
//! Updates are partial and field-group-scoped: a job never removes or
//! overwrites fields written by a different field group's job, and every
//! upsert is idempotent, so replaying a batch after a failure is safe.

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod job;
pub mod projection;
pub mod queries;
pub mod reset;
pub mod scheduler;
pub mod store;

pub use catalog::{
    default_catalog, filtered_catalog, CollectionRef, DataType, FieldFilter, FieldFlags, FieldKind,
};
pub use client::{Row, RowStream, SparqlClient};
pub use config::{UpdateContext, DEFAULT_BATCH_SIZE};
pub use error::{DecodeError, Result, TransportError, UpdateError, UpsertError};
pub use job::{JobOutcome, RowWindow, UpdateJob};
pub use scheduler::{RunReport, Scheduler, UnitFailure, UnitReport};
pub use store::{DocumentStore, MemoryStore, MongoStore, UpdateDoc};
