//! Operator favorites, keyed by the store-assigned item id.

use sqlx::SqlitePool;

/// Flip the favorite flag for an item; returns the new state.
pub async fn toggle(pool: &SqlitePool, item_id: &str) -> Result<bool, sqlx::Error> {
    if is_favorite(pool, item_id).await? {
        sqlx::query("DELETE FROM favorite WHERE item_id = ?")
            .bind(item_id)
            .execute(pool)
            .await?;
        Ok(false)
    } else {
        sqlx::query("INSERT OR IGNORE INTO favorite (item_id, created_ts) VALUES (?, ?)")
            .bind(item_id)
            .bind(chrono::Utc::now().timestamp_millis())
            .execute(pool)
            .await?;
        Ok(true)
    }
}

pub async fn is_favorite(pool: &SqlitePool, item_id: &str) -> Result<bool, sqlx::Error> {
    let row: Option<(String,)> = sqlx::query_as("SELECT item_id FROM favorite WHERE item_id = ?")
        .bind(item_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// Favorited item ids, most recently favorited first.
pub async fn list(pool: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT item_id FROM favorite ORDER BY created_ts DESC")
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}
