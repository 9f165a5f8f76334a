//! Database reset
//!
//! Drops the target database and recreates the fixed index sets. The index
//! catalogs are an external contract shared with the query front-end: one
//! shape for entity-style collections, one for the shared ontology-union
//! collection (text and ascending swapped between lcLabel and definition).
//!
//! Runs once before any jobs, never concurrently with them.

use mongodb::bson::{doc, Document};
use mongodb::{Client, IndexModel};
use tracing::info;

use crate::error::UpsertError;

/// Index set for entity-style collections (prot, gene)
fn entity_indexes() -> Vec<IndexModel> {
    [
        doc! { "prefLabel": 1 },
        doc! { "synonyms": 1 },
        doc! { "lcSynonyms": 1 },
        doc! { "definition": "text" },
        doc! { "lcLabel": 1 },
        doc! { "refScore": -1 },
        doc! { "fromScore": -1 },
        doc! { "toScore": -1 },
        doc! { "taxon": 1 },
    ]
    .into_iter()
    .map(|keys| IndexModel::builder().keys(keys).build())
    .collect()
}

/// Index set for the shared ontology-union collection (goall)
fn union_indexes() -> Vec<IndexModel> {
    [
        doc! { "prefLabel": 1 },
        doc! { "synonyms": 1 },
        doc! { "lcSynonyms": 1 },
        doc! { "definition": 1 },
        doc! { "lcLabel": "text" },
        doc! { "refScore": -1 },
        doc! { "fromScore": -1 },
        doc! { "toScore": -1 },
    ]
    .into_iter()
    .map(|keys| IndexModel::builder().keys(keys).build())
    .collect()
}

/// Drop the database and recreate the fixed indexes.
pub async fn drop_and_reset(client: &Client, db_name: &str) -> Result<(), UpsertError> {
    client.database(db_name).drop().await?;
    info!("Dropped database {db_name}");

    let db = client.database(db_name);
    db.collection::<Document>("prot")
        .create_indexes(entity_indexes())
        .await?;
    db.collection::<Document>("gene")
        .create_indexes(entity_indexes())
        .await?;
    db.collection::<Document>("goall")
        .create_indexes(union_indexes())
        .await?;
    info!("Recreated indexes for prot, gene and goall");

    Ok(())
}
