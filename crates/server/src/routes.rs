use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use cineteca_core::entity::{ContentItem, Feedback, NewsBanner};
use cineteca_core::error::ApiError;
use cineteca_core::validate;
use cineteca_metadata::tmdb::{ImageSize, image_url};
use cineteca_metadata::upcoming::{self, UpcomingEntry};
use cineteca_metadata::{MediaKind, ProviderError};
use cineteca_store::repo::{banner, catalog, favorites, feedback};

use crate::error::AppError;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/catalog", post(create_content).get(list_catalog))
        .route(
            "/catalog/{id}",
            get(get_content).put(update_content).delete(delete_content),
        )
        .route("/catalog/{id}/favorite", post(toggle_favorite))
        .route("/favorites", get(list_favorites))
        // Upcoming episodes
        .route("/upcoming", get(get_upcoming))
        .route("/upcoming/{date}", get(get_upcoming_on))
        // Provider search
        .route("/search", get(search_titles))
        // Side channels
        .route("/feedback", post(add_feedback).get(list_feedback))
        .route("/banner", get(get_banner).put(put_banner))
}

/// The entity's own serialization skips the store-assigned id, so responses
/// re-attach it alongside the document fields.
fn item_json(item: &ContentItem) -> Value {
    let mut doc = serde_json::to_value(item).unwrap_or(Value::Null);
    doc["id"] = Value::String(item.id().to_string());
    doc
}

fn provider_error(e: ProviderError) -> ApiError {
    match e {
        ProviderError::Overloaded(msg) => ApiError::ProviderTransient(msg),
        ProviderError::NotFound => ApiError::NotFound("title not found".into()),
        other => ApiError::ProviderUnavailable(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    sqlx::query("SELECT 1")
        .execute(&state.db)
        .await
        .map_err(|e| ApiError::Internal(format!("database check failed: {e}")))?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

async fn create_content(
    State(state): State<AppState>,
    Json(body): Json<ContentItem>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    validate::content(&body).map_err(ApiError::Validation)?;

    let id = catalog::create(&state.db, &body)
        .await
        .map_err(|e| ApiError::Internal(format!("store error: {e}")))?;

    let item = catalog::get_by_id(&state.db, &id)
        .await
        .map_err(|e| ApiError::Internal(format!("store error: {e}")))?
        .ok_or_else(|| ApiError::Internal("created item not readable".into()))?;

    Ok((StatusCode::CREATED, Json(item_json(&item))))
}

async fn list_catalog(State(state): State<AppState>) -> Result<Json<Vec<Value>>, AppError> {
    let items = catalog::list(&state.db)
        .await
        .map_err(|e| ApiError::Internal(format!("store error: {e}")))?;

    Ok(Json(items.iter().map(item_json).collect()))
}

async fn get_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let item = catalog::get_by_id(&state.db, &id)
        .await
        .map_err(|e| ApiError::Internal(format!("store error: {e}")))?
        .ok_or_else(|| ApiError::NotFound("item not found".into()))?;

    Ok(Json(item_json(&item)))
}

async fn update_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ContentItem>,
) -> Result<Json<Value>, AppError> {
    let existing = catalog::get_by_id(&state.db, &id)
        .await
        .map_err(|e| ApiError::Internal(format!("store error: {e}")))?
        .ok_or_else(|| ApiError::NotFound("item not found".into()))?;

    // An item never changes kind; a movie edited into a series is a new item.
    if existing.kind() != body.kind() {
        return Err(ApiError::BadRequest(format!(
            "contentType is immutable (stored as {})",
            existing.kind()
        ))
        .into());
    }

    validate::content(&body).map_err(ApiError::Validation)?;

    catalog::update(&state.db, &id, &body)
        .await
        .map_err(|e| ApiError::Internal(format!("store error: {e}")))?;

    let item = catalog::get_by_id(&state.db, &id)
        .await
        .map_err(|e| ApiError::Internal(format!("store error: {e}")))?
        .ok_or_else(|| ApiError::NotFound("item not found".into()))?;

    Ok(Json(item_json(&item)))
}

async fn delete_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    catalog::delete(&state.db, &id)
        .await
        .map_err(|e| ApiError::Internal(format!("store error: {e}")))?;

    Ok(Json(serde_json::json!({ "deleted": true })))
}

// ---------------------------------------------------------------------------
// Favorites
// ---------------------------------------------------------------------------

async fn toggle_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    catalog::get_by_id(&state.db, &id)
        .await
        .map_err(|e| ApiError::Internal(format!("store error: {e}")))?
        .ok_or_else(|| ApiError::NotFound("item not found".into()))?;

    let favorite = favorites::toggle(&state.db, &id)
        .await
        .map_err(|e| ApiError::Internal(format!("db error: {e}")))?;

    Ok(Json(serde_json::json!({ "favorite": favorite })))
}

async fn list_favorites(State(state): State<AppState>) -> Result<Json<Vec<Value>>, AppError> {
    let ids = favorites::list(&state.db)
        .await
        .map_err(|e| ApiError::Internal(format!("db error: {e}")))?;

    let mut items = Vec::with_capacity(ids.len());
    for id in ids {
        // A favorite may outlive its item; skip the dangling reference.
        if let Some(item) = catalog::get_by_id(&state.db, &id)
            .await
            .map_err(|e| ApiError::Internal(format!("store error: {e}")))?
        {
            items.push(item_json(&item));
        }
    }

    Ok(Json(items))
}

// ---------------------------------------------------------------------------
// Upcoming episodes
// ---------------------------------------------------------------------------

async fn reconciled_upcoming(
    state: &AppState,
    today: NaiveDate,
) -> Result<Vec<UpcomingEntry>, AppError> {
    let feed = upcoming::fetch_upcoming(state.provider.as_ref(), today)
        .await
        .map_err(provider_error)?;

    let items = catalog::list(&state.db)
        .await
        .map_err(|e| ApiError::Internal(format!("store error: {e}")))?;

    Ok(upcoming::reconcile(feed, &items))
}

fn entry_json(entry: &UpcomingEntry) -> Value {
    serde_json::json!({
        "episode": entry.episode,
        "item": item_json(&entry.item),
        "address": entry.address,
        "matched": entry.matched,
    })
}

async fn get_upcoming(State(state): State<AppState>) -> Result<Json<Vec<Value>>, AppError> {
    let today = chrono::Utc::now().date_naive();
    let entries = reconciled_upcoming(&state, today).await?;
    Ok(Json(entries.iter().map(entry_json).collect()))
}

async fn get_upcoming_on(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<Vec<Value>>, AppError> {
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest("date must be YYYY-MM-DD".into()))?;

    let today = chrono::Utc::now().date_naive();
    let entries = reconciled_upcoming(&state, today).await?;
    let selected: Vec<Value> = upcoming::on_day(&entries, date)
        .into_iter()
        .map(entry_json)
        .collect();

    Ok(Json(selected))
}

// ---------------------------------------------------------------------------
// Provider search
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
}

#[derive(Serialize)]
struct SearchResult {
    id: String,
    titulo: String,
    #[serde(rename = "mediaType")]
    media_type: MediaKind,
    #[serde(rename = "posterUrl")]
    poster_url: String,
    #[serde(rename = "anoLancamento")]
    ano_lancamento: Option<i32>,
    sinopse: Option<String>,
    generos: String,
}

async fn search_titles(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SearchResult>>, AppError> {
    if query.q.trim().is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".into()).into());
    }

    let hits = state
        .provider
        .search(query.q.trim())
        .await
        .map_err(provider_error)?;

    // Genre names are decoration; a lookup failure degrades to bare results.
    let genres = match state.provider.genre_table().await {
        Ok(table) => table,
        Err(e) => {
            warn!(error = %e, "genre lookup failed, returning results without genre names");
            Default::default()
        }
    };

    let results = hits
        .into_iter()
        .map(|hit| SearchResult {
            poster_url: image_url(hit.poster_path.as_deref(), ImageSize::Thumb),
            ano_lancamento: hit
                .release_date
                .as_deref()
                .and_then(|d| d.get(..4))
                .and_then(|y| y.parse().ok()),
            generos: genres.resolve(&hit.genre_ids).join(", "),
            id: hit.provider_id,
            titulo: hit.title,
            media_type: hit.media_type,
            sinopse: hit.overview,
        })
        .collect();

    Ok(Json(results))
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

async fn add_feedback(
    State(state): State<AppState>,
    Json(body): Json<Feedback>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    validate::feedback(&body).map_err(ApiError::Validation)?;

    let id = feedback::add(&state.db, &body)
        .await
        .map_err(|e| ApiError::Internal(format!("store error: {e}")))?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

async fn list_feedback(State(state): State<AppState>) -> Result<Json<Vec<Value>>, AppError> {
    let entries = feedback::list(&state.db)
        .await
        .map_err(|e| ApiError::Internal(format!("store error: {e}")))?;

    Ok(Json(
        entries
            .iter()
            .map(|entry| {
                let mut doc = serde_json::to_value(entry).unwrap_or(Value::Null);
                doc["id"] = Value::String(entry.id.clone());
                doc
            })
            .collect(),
    ))
}

// ---------------------------------------------------------------------------
// News banner
// ---------------------------------------------------------------------------

async fn get_banner(
    State(state): State<AppState>,
) -> Result<Json<Option<NewsBanner>>, AppError> {
    let current = banner::get(&state.db)
        .await
        .map_err(|e| ApiError::Internal(format!("store error: {e}")))?;

    Ok(Json(current))
}

async fn put_banner(
    State(state): State<AppState>,
    Json(body): Json<NewsBanner>,
) -> Result<Json<NewsBanner>, AppError> {
    validate::news_banner(&body).map_err(ApiError::Validation)?;

    banner::set(&state.db, &body)
        .await
        .map_err(|e| ApiError::Internal(format!("store error: {e}")))?;

    Ok(Json(body))
}
