//! Document store seam
//!
//! Jobs write through the [`DocumentStore`] trait rather than a concrete
//! driver; the scheduler owns the connection and hands each job a scoped
//! handle. [`mongo::MongoStore`] is the production implementation;
//! [`memory::MemoryStore`] mirrors its merge semantics in-process and backs
//! the test suite.

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use async_trait::async_trait;
use mongodb::bson::{doc, Document};

use crate::error::UpsertError;

/// A partial update for one entity document.
///
/// `Set` replaces the named scalar fields; `AddToSet` unions values into the
/// named set-valued fields. Both are idempotent under replay, which is what
/// makes re-running a failed job safe.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateDoc {
    Set(Document),
    AddToSet(Document),
}

impl UpdateDoc {
    /// The driver-level update document (`$set` / `$addToSet`).
    pub fn to_update_document(&self) -> Document {
        match self {
            UpdateDoc::Set(fields) => doc! { "$set": fields.clone() },
            UpdateDoc::AddToSet(fields) => doc! { "$addToSet": fields.clone() },
        }
    }

    pub fn fields(&self) -> &Document {
        match self {
            UpdateDoc::Set(fields) | UpdateDoc::AddToSet(fields) => fields,
        }
    }
}

/// Upsert sink for entity documents keyed by `_id`
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Apply one partial update to one collection, creating the document if
    /// the id is unseen. Must never remove or overwrite fields outside the
    /// update's own field group.
    async fn upsert(
        &self,
        collection: &str,
        entity_id: &str,
        update: &UpdateDoc,
    ) -> Result<(), UpsertError>;

    /// Delete every document in the collection, returning the removed count.
    async fn wipe(&self, collection: &str) -> Result<u64, UpsertError>;
}
