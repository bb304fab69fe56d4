//! Operator feedback collection.

use sqlx::SqlitePool;

use cineteca_core::entity::Feedback;

use crate::{docs, map, StoreError};

const COLLECTION: &str = "feedback";

pub async fn add(pool: &SqlitePool, entry: &Feedback) -> Result<String, StoreError> {
    let mut doc = serde_json::to_value(entry).map_err(|source| StoreError::Malformed {
        id: entry.id.clone(),
        source,
    })?;
    if let Some(obj) = doc.as_object_mut() {
        obj.remove("createdAt");
    }
    let id = docs::insert(pool, COLLECTION, &doc).await?;
    Ok(id)
}

/// All feedback entries, newest first.
pub async fn list(pool: &SqlitePool) -> Result<Vec<Feedback>, StoreError> {
    let raws = docs::list(pool, COLLECTION).await?;
    raws.into_iter()
        .map(|raw| {
            let created_at = raw.doc.get("createdAt").and_then(map::timestamp_to_iso);
            let mut doc = raw.doc;
            if let Some(obj) = doc.as_object_mut() {
                obj.remove("createdAt");
                obj.remove("updatedAt");
            }
            let mut entry: Feedback = serde_json::from_value(doc).map_err(|source| {
                StoreError::Malformed {
                    id: raw.id.clone(),
                    source,
                }
            })?;
            entry.id = raw.id;
            entry.created_at = created_at;
            Ok(entry)
        })
        .collect()
}
