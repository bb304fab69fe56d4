//! Persistence mapper.
//!
//! Translates raw persisted documents into canonical in-memory entities and
//! back. The read direction is deliberately tolerant: nested collections may
//! be absent, null or of the wrong shape in old documents, and the audit
//! timestamps have shown up over time as store-native epoch integers, as
//! `{"seconds": …}` objects from a previous backend, and as ISO strings.

use serde_json::Value;

use cineteca_core::entity::ContentItem;

use crate::docs::RawDocument;
use crate::StoreError;

/// Normalize a raw timestamp value to an ISO-8601 string.
///
/// Integers are epoch milliseconds (the store's native stamp), `{"seconds"}`
/// objects are legacy second-resolution stamps, strings pass through as-is.
/// Anything else is simply absent; a missing timestamp never fails a read.
pub fn timestamp_to_iso(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(chrono::DateTime::from_timestamp_millis)
            .map(|dt| dt.to_rfc3339()),
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("seconds")
            .and_then(Value::as_i64)
            .and_then(|s| chrono::DateTime::from_timestamp(s, 0))
            .map(|dt| dt.to_rfc3339()),
        _ => None,
    }
}

/// Map a raw document into the canonical entity.
///
/// Exactly two `contentType` values are mappable; anything else is a
/// data-integrity failure carrying the offending id, not a recoverable
/// validation problem.
pub fn to_entity(raw: RawDocument) -> Result<ContentItem, StoreError> {
    let RawDocument { id, mut doc } = raw;

    match doc.get("contentType").and_then(Value::as_str) {
        Some("movie") | Some("series") => {}
        other => {
            return Err(StoreError::UnknownContentType {
                id,
                value: other.unwrap_or("<missing>").to_string(),
            });
        }
    }

    let created_at = doc.get("createdAt").and_then(timestamp_to_iso);
    let updated_at = doc.get("updatedAt").and_then(timestamp_to_iso);

    normalize_collections(&mut doc);
    if let Some(map) = doc.as_object_mut() {
        map.remove("createdAt");
        map.remove("updatedAt");
    }

    let mut item: ContentItem = serde_json::from_value(doc)
        .map_err(|source| StoreError::Malformed { id: id.clone(), source })?;

    let common = item.common_mut();
    common.id = id;
    common.created_at = created_at;
    common.updated_at = updated_at;
    Ok(item)
}

/// Map an entity into its write payload. Audit timestamps are stripped:
/// only the store layer stamps them, with its own clock.
pub fn to_document(item: &ContentItem) -> Result<Value, StoreError> {
    let mut doc = serde_json::to_value(item).map_err(|source| StoreError::Malformed {
        id: item.id().to_string(),
        source,
    })?;
    if let Some(map) = doc.as_object_mut() {
        map.remove("createdAt");
        map.remove("updatedAt");
    }
    Ok(doc)
}

/// Every nested collection materializes as an empty array when absent, null
/// or malformed, so downstream code never sees a missing list.
fn normalize_collections(doc: &mut Value) {
    let kind = doc
        .get("contentType")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match kind.as_str() {
        "movie" => ensure_array(doc, "videoSources"),
        "series" => {
            ensure_array(doc, "temporadas");
            if let Some(temporadas) = doc.get_mut("temporadas").and_then(Value::as_array_mut) {
                // Entries that are not objects at all cannot hold episodes;
                // drop them rather than fail the whole document.
                temporadas.retain(|t| t.is_object());
                for temporada in temporadas.iter_mut() {
                    ensure_array(temporada, "episodios");
                    if let Some(episodios) =
                        temporada.get_mut("episodios").and_then(Value::as_array_mut)
                    {
                        episodios.retain(|e| e.is_object());
                        for episodio in episodios.iter_mut() {
                            ensure_array(episodio, "videoSources");
                        }
                    }
                }
            }
        }
        _ => {}
    }
}

fn ensure_array(value: &mut Value, key: &str) {
    let Some(map) = value.as_object_mut() else {
        return;
    };
    match map.get(key) {
        Some(Value::Array(_)) => {}
        _ => {
            map.insert(key.to_string(), Value::Array(Vec::new()));
        }
    }
}
