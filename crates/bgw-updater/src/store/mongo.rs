//! MongoDB-backed document store

use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::Database;

use super::{DocumentStore, UpdateDoc};
use crate::error::UpsertError;

/// Document store over one MongoDB database.
///
/// `Database` is a cheap pooled handle; cloning the store gives each worker
/// its own handle onto the shared connection pool.
#[derive(Debug, Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn upsert(
        &self,
        collection: &str,
        entity_id: &str,
        update: &UpdateDoc,
    ) -> Result<(), UpsertError> {
        self.db
            .collection::<Document>(collection)
            .update_one(doc! { "_id": entity_id }, update.to_update_document())
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn wipe(&self, collection: &str) -> Result<u64, UpsertError> {
        let result = self
            .db
            .collection::<Document>(collection)
            .delete_many(doc! {})
            .await?;
        Ok(result.deleted_count)
    }
}
