//! Catalog repository: CRUD facade over mapped content entities.
//!
//! Inputs are assumed to have passed schema validation already; this layer
//! persists, it does not re-validate.

use sqlx::SqlitePool;

use cineteca_core::entity::ContentItem;

use crate::{docs, map, StoreError};

const COLLECTION: &str = "conteudos";

/// Persist a new item; the store assigns the id and both audit stamps.
pub async fn create(pool: &SqlitePool, item: &ContentItem) -> Result<String, StoreError> {
    let doc = map::to_document(item)?;
    let id = docs::insert(pool, COLLECTION, &doc).await?;
    Ok(id)
}

/// All catalog items, most recently touched first.
///
/// A document that fails to map aborts the whole fetch; a silently shortened
/// list would be indistinguishable from "no data".
pub async fn list(pool: &SqlitePool) -> Result<Vec<ContentItem>, StoreError> {
    let raws = docs::list(pool, COLLECTION).await?;
    raws.into_iter().map(map::to_entity).collect()
}

/// Absent is an expected outcome, not a fault.
pub async fn get_by_id(pool: &SqlitePool, id: &str) -> Result<Option<ContentItem>, StoreError> {
    match docs::get(pool, COLLECTION, id).await? {
        Some(raw) => Ok(Some(map::to_entity(raw)?)),
        None => Ok(None),
    }
}

/// Replace an item's document; refreshes `updatedAt` only. Returns whether
/// the id existed.
pub async fn update(pool: &SqlitePool, id: &str, item: &ContentItem) -> Result<bool, StoreError> {
    let doc = map::to_document(item)?;
    Ok(docs::update(pool, COLLECTION, id, &doc).await?)
}

/// Hard delete, idempotent.
pub async fn delete(pool: &SqlitePool, id: &str) -> Result<(), StoreError> {
    docs::delete(pool, COLLECTION, id).await?;
    Ok(())
}
