//! Raw JSON document store.
//!
//! One row per document, keyed by `(collection, id)`. Ids are assigned here,
//! never by callers, and the audit stamps are written with this layer's
//! clock so client clock skew never reaches the documents.

use serde_json::Value;
use sqlx::SqlitePool;

/// A document as read back from the store: the JSON blob plus the id it was
/// filed under. The read path injects `createdAt`/`updatedAt` into the blob
/// as epoch-millisecond integers.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub id: String,
    pub doc: Value,
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn inflate(id: String, text: String, created_ts: i64, updated_ts: i64) -> RawDocument {
    // A blob that no longer parses comes back as Null; the mapper turns
    // that into a per-document integrity error carrying the id.
    let mut doc: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
    if let Some(map) = doc.as_object_mut() {
        map.entry("createdAt").or_insert_with(|| created_ts.into());
        map.entry("updatedAt").or_insert_with(|| updated_ts.into());
    }
    RawDocument { id, doc }
}

/// Insert a document; returns the newly assigned id. Both audit stamps get
/// the same instant so a fresh document reads back `createdAt == updatedAt`.
pub async fn insert(
    pool: &SqlitePool,
    collection: &str,
    doc: &Value,
) -> Result<String, sqlx::Error> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = now_ms();
    sqlx::query(
        "INSERT INTO document (collection, id, doc, created_ts, updated_ts) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(collection)
    .bind(&id)
    .bind(doc.to_string())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(id)
}

/// All documents in a collection, most recently touched first.
pub async fn list(pool: &SqlitePool, collection: &str) -> Result<Vec<RawDocument>, sqlx::Error> {
    let rows: Vec<(String, String, i64, i64)> = sqlx::query_as(
        "SELECT id, doc, created_ts, updated_ts FROM document \
         WHERE collection = ? ORDER BY updated_ts DESC",
    )
    .bind(collection)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, doc, created, updated)| inflate(id, doc, created, updated))
        .collect())
}

pub async fn get(
    pool: &SqlitePool,
    collection: &str,
    id: &str,
) -> Result<Option<RawDocument>, sqlx::Error> {
    let row: Option<(String, String, i64, i64)> = sqlx::query_as(
        "SELECT id, doc, created_ts, updated_ts FROM document \
         WHERE collection = ? AND id = ?",
    )
    .bind(collection)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(id, doc, created, updated)| inflate(id, doc, created, updated)))
}

/// Replace a document's blob and refresh `updated_ts` only; `created_ts` is
/// immutable. Returns whether the id existed.
pub async fn update(
    pool: &SqlitePool,
    collection: &str,
    id: &str,
    doc: &Value,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE document SET doc = ?, updated_ts = ? WHERE collection = ? AND id = ?",
    )
    .bind(doc.to_string())
    .bind(now_ms())
    .bind(collection)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Hard delete; deleting an absent id is not an error.
pub async fn delete(pool: &SqlitePool, collection: &str, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM document WHERE collection = ? AND id = ?")
        .bind(collection)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn pool() -> SqlitePool {
        let pool = crate::connect(":memory:").await.unwrap();
        crate::migrate::run(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn insert_assigns_id_and_equal_stamps() {
        let pool = pool().await;
        let id = insert(&pool, "c", &serde_json::json!({ "a": 1 }))
            .await
            .unwrap();
        assert!(!id.is_empty());

        let raw = get(&pool, "c", &id).await.unwrap().unwrap();
        assert_eq!(raw.doc["a"], 1);
        assert_eq!(raw.doc["createdAt"], raw.doc["updatedAt"]);
    }

    #[tokio::test]
    async fn update_refreshes_updated_only() {
        let pool = pool().await;
        let id = insert(&pool, "c", &serde_json::json!({ "a": 1 }))
            .await
            .unwrap();
        let before = get(&pool, "c", &id).await.unwrap().unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        assert!(update(&pool, "c", &id, &serde_json::json!({ "a": 2 }))
            .await
            .unwrap());

        let after = get(&pool, "c", &id).await.unwrap().unwrap();
        assert_eq!(after.doc["a"], 2);
        assert_eq!(after.doc["createdAt"], before.doc["createdAt"]);
        assert!(after.doc["updatedAt"].as_i64() > before.doc["updatedAt"].as_i64());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let pool = pool().await;
        let id = insert(&pool, "c", &serde_json::json!({})).await.unwrap();
        delete(&pool, "c", &id).await.unwrap();
        delete(&pool, "c", &id).await.unwrap();
        assert!(get(&pool, "c", &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let pool = pool().await;
        insert(&pool, "a", &serde_json::json!({})).await.unwrap();
        insert(&pool, "b", &serde_json::json!({})).await.unwrap();
        assert_eq!(list(&pool, "a").await.unwrap().len(), 1);
    }
}
