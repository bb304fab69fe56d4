//! Single news-banner document: read current, replace in place.

use sqlx::SqlitePool;

use cineteca_core::entity::NewsBanner;

use crate::{docs, StoreError};

const COLLECTION: &str = "news_banner";

pub async fn get(pool: &SqlitePool) -> Result<Option<NewsBanner>, StoreError> {
    let raws = docs::list(pool, COLLECTION).await?;
    let Some(raw) = raws.into_iter().next() else {
        return Ok(None);
    };
    let banner: NewsBanner =
        serde_json::from_value(raw.doc).map_err(|source| StoreError::Malformed {
            id: raw.id,
            source,
        })?;
    Ok(Some(banner))
}

/// Replace the banner; creates the document on first write.
pub async fn set(pool: &SqlitePool, banner: &NewsBanner) -> Result<(), StoreError> {
    let doc = serde_json::to_value(banner).map_err(|source| StoreError::Malformed {
        id: String::new(),
        source,
    })?;

    let existing = docs::list(pool, COLLECTION).await?;
    match existing.first() {
        Some(raw) => {
            docs::update(pool, COLLECTION, &raw.id, &doc).await?;
        }
        None => {
            docs::insert(pool, COLLECTION, &doc).await?;
        }
    }
    Ok(())
}
