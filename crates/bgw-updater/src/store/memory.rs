//! In-memory document store
//!
//! Applies the same create-or-merge semantics as the MongoDB store: `$set`
//! replaces scalar fields, `$addToSet` unions into array fields, and a
//! document is created with its `_id` on first upsert. Used by the test
//! suite to verify pipeline behavior without a running server.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use mongodb::bson::{doc, Bson, Document};
use tokio::sync::Mutex;

use super::{DocumentStore, UpdateDoc};
use crate::error::UpsertError;

/// Document store holding all collections in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, BTreeMap<String, Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a stored document by id.
    pub async fn document(&self, collection: &str, entity_id: &str) -> Option<Document> {
        self.collections
            .lock()
            .await
            .get(collection)
            .and_then(|docs| docs.get(entity_id))
            .cloned()
    }

    /// Number of documents in a collection.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    /// Insert a document verbatim, for seeding test fixtures.
    pub async fn seed(&self, collection: &str, entity_id: &str, document: Document) {
        self.collections
            .lock()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(entity_id.to_string(), document);
    }
}

fn push_unique(existing: &mut Document, key: &str, value: &Bson) {
    match existing.get_mut(key) {
        Some(Bson::Array(items)) => {
            if !items.iter().any(|item| item == value) {
                items.push(value.clone());
            }
        }
        _ => {
            existing.insert(key, Bson::Array(vec![value.clone()]));
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn upsert(
        &self,
        collection: &str,
        entity_id: &str,
        update: &UpdateDoc,
    ) -> Result<(), UpsertError> {
        let mut collections = self.collections.lock().await;
        let document = collections
            .entry(collection.to_string())
            .or_default()
            .entry(entity_id.to_string())
            .or_insert_with(|| doc! { "_id": entity_id });

        match update {
            UpdateDoc::Set(fields) => {
                for (key, value) in fields {
                    document.insert(key.as_str(), value.clone());
                }
            }
            UpdateDoc::AddToSet(fields) => {
                for (key, value) in fields {
                    push_unique(document, key.as_str(), value);
                }
            }
        }

        Ok(())
    }

    async fn wipe(&self, collection: &str) -> Result<u64, UpsertError> {
        let mut collections = self.collections.lock().await;
        match collections.get_mut(collection) {
            Some(docs) => {
                let removed = docs.len() as u64;
                docs.clear();
                Ok(removed)
            }
            None => Ok(0),
        }
    }
}
