use std::sync::Arc;

use axum_test::TestServer;
use chrono::{Days, Utc};
use serde_json::{Value, json};

use cineteca_metadata::provider::MetadataProvider;
use cineteca_metadata::{
    GenreTable, MediaKind, NextEpisode, ProviderError, SearchHit, TitleDetails,
};
use cineteca_server::routes::build_router;
use cineteca_server::state::AppState;

/// Canned metadata provider: one airing series ("500") whose next episode
/// lands five days from now, plus a fixed search result.
struct StubProvider {
    overloaded: bool,
}

fn days_from_now(days: u64) -> String {
    Utc::now()
        .date_naive()
        .checked_add_days(Days::new(days))
        .unwrap()
        .format("%Y-%m-%d")
        .to_string()
}

#[async_trait::async_trait]
impl MetadataProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn search(&self, _query: &str) -> Result<Vec<SearchHit>, ProviderError> {
        Ok(vec![SearchHit {
            provider_id: "500".into(),
            title: "Cidade Invisível".into(),
            media_type: MediaKind::Tv,
            poster_path: None,
            release_date: Some("2021-02-05".into()),
            overview: Some("Folclore brasileiro.".into()),
            genre_ids: vec![18],
            popularity: 80.0,
        }])
    }

    async fn fetch_details(
        &self,
        provider_id: &str,
        _kind: MediaKind,
    ) -> Result<TitleDetails, ProviderError> {
        if provider_id != "500" {
            return Err(ProviderError::NotFound);
        }
        Ok(TitleDetails {
            provider_id: "500".into(),
            title: Some("Cidade Invisível".into()),
            overview: Some("Folclore brasileiro.".into()),
            next_episode_to_air: Some(NextEpisode {
                season_number: 2,
                episode_number: 5,
                air_date: Some(days_from_now(5)),
                name: Some("Tutu".into()),
                overview: None,
            }),
            ..Default::default()
        })
    }

    async fn on_the_air(&self) -> Result<Vec<SearchHit>, ProviderError> {
        if self.overloaded {
            return Err(ProviderError::Overloaded("stub overloaded".into()));
        }
        self.search("").await
    }

    async fn genre_table(&self) -> Result<GenreTable, ProviderError> {
        Ok(GenreTable::new(std::collections::HashMap::from([(
            18,
            "Drama".to_string(),
        )])))
    }
}

async fn test_app_with(provider: StubProvider) -> TestServer {
    let pool = cineteca_store::connect(":memory:").await.unwrap();
    cineteca_store::migrate::run(&pool).await.unwrap();

    let state = AppState {
        db: pool,
        provider: Arc::new(provider),
    };
    TestServer::new(build_router(state)).unwrap()
}

async fn test_app() -> TestServer {
    test_app_with(StubProvider { overloaded: false }).await
}

fn sample_movie() -> Value {
    json!({
        "contentType": "movie",
        "tituloOriginal": "Bacurau",
        "anoLancamento": 2019,
        "videoSources": [{ "serverName": "Alpha", "url": "https://cdn.example/bacurau.mp4" }]
    })
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let server = test_app().await;
    let resp = server.get("/health").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn catalog_crud_round_trip() {
    let server = test_app().await;

    let resp = server.post("/api/v1/catalog").json(&sample_movie()).await;
    resp.assert_status(axum::http::StatusCode::CREATED);
    let created: Value = resp.json();
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["tituloOriginal"], "Bacurau");
    assert_eq!(created["createdAt"], created["updatedAt"]);

    let resp = server.get("/api/v1/catalog").await;
    resp.assert_status_ok();
    let list: Value = resp.json();
    assert_eq!(list.as_array().unwrap().len(), 1);

    let mut edited = created.clone();
    edited["sinopse"] = json!("Sertão, futuro próximo.");
    let resp = server
        .put(&format!("/api/v1/catalog/{id}"))
        .json(&edited)
        .await;
    resp.assert_status_ok();
    let updated: Value = resp.json();
    assert_eq!(updated["sinopse"], "Sertão, futuro próximo.");

    let resp = server.delete(&format!("/api/v1/catalog/{id}")).await;
    resp.assert_status_ok();
    // Idempotent: a second delete is still a success.
    let resp = server.delete(&format!("/api/v1/catalog/{id}")).await;
    resp.assert_status_ok();

    let resp = server.get(&format!("/api/v1/catalog/{id}")).await;
    resp.assert_status(axum::http::StatusCode::NOT_FOUND);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn invalid_item_reports_field_paths() {
    let server = test_app().await;

    let resp = server
        .post("/api/v1/catalog")
        .json(&json!({
            "contentType": "movie",
            "tituloOriginal": "  ",
            "videoSources": [{ "serverName": "Alpha", "url": "not a url" }]
        }))
        .await;
    resp.assert_status(axum::http::StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "validation_error");

    let paths: Vec<&str> = body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["path"].as_str().unwrap())
        .collect();
    assert!(paths.contains(&"tituloOriginal"));
    assert!(paths.contains(&"videoSources[0].url"));
}

#[tokio::test]
async fn content_type_is_immutable_on_update() {
    let server = test_app().await;

    let resp = server.post("/api/v1/catalog").json(&sample_movie()).await;
    let created: Value = resp.json();
    let id = created["id"].as_str().unwrap();

    let resp = server
        .put(&format!("/api/v1/catalog/{id}"))
        .json(&json!({
            "contentType": "series",
            "tituloOriginal": "Bacurau"
        }))
        .await;
    resp.assert_status(axum::http::StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn favorite_toggle_flips_and_lists_items() {
    let server = test_app().await;

    let resp = server.post("/api/v1/catalog").json(&sample_movie()).await;
    let created: Value = resp.json();
    let id = created["id"].as_str().unwrap();

    let resp = server
        .post(&format!("/api/v1/catalog/{id}/favorite"))
        .await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["favorite"], true);

    let resp = server.get("/api/v1/favorites").await;
    let favorites: Value = resp.json();
    assert_eq!(favorites[0]["id"], *id);

    let resp = server
        .post(&format!("/api/v1/catalog/{id}/favorite"))
        .await;
    let body: Value = resp.json();
    assert_eq!(body["favorite"], false);

    let resp = server.get("/api/v1/favorites").await;
    let favorites: Value = resp.json();
    assert!(favorites.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn favoriting_missing_item_is_not_found() {
    let server = test_app().await;
    let resp = server.post("/api/v1/catalog/nope/favorite").await;
    resp.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upcoming_matches_registered_series() {
    let server = test_app().await;

    let resp = server
        .post("/api/v1/catalog")
        .json(&json!({
            "contentType": "series",
            "tituloOriginal": "Cidade Invisível",
            "tmdbId": "500"
        }))
        .await;
    let created: Value = resp.json();
    let local_id = created["id"].as_str().unwrap();

    let resp = server.get("/api/v1/upcoming").await;
    resp.assert_status_ok();
    let entries: Value = resp.json();
    assert_eq!(entries.as_array().unwrap().len(), 1);

    let entry = &entries[0];
    assert_eq!(entry["matched"], true);
    assert_eq!(entry["item"]["id"], *local_id);
    assert_eq!(entry["address"]["seasonNumber"], 2);
    assert_eq!(entry["address"]["episodeIndex"], 4);
    assert_eq!(entry["episode"]["episodeTitle"], "Tutu");
}

#[tokio::test]
async fn upcoming_synthesizes_unregistered_series() {
    let server = test_app().await;

    let resp = server.get("/api/v1/upcoming").await;
    resp.assert_status_ok();
    let entries: Value = resp.json();

    let entry = &entries[0];
    assert_eq!(entry["matched"], false);
    assert_eq!(entry["item"]["id"], "ext-500");
    assert_eq!(entry["address"]["episodeIndex"], 0);

    // The synthesized stand-in never lands in the catalog.
    let resp = server.get("/api/v1/catalog").await;
    let list: Value = resp.json();
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn upcoming_day_selection_filters_by_air_date() {
    let server = test_app().await;

    let on_air = server
        .get(&format!("/api/v1/upcoming/{}", days_from_now(5)))
        .await;
    let entries: Value = on_air.json();
    assert_eq!(entries.as_array().unwrap().len(), 1);

    let off_air = server
        .get(&format!("/api/v1/upcoming/{}", days_from_now(6)))
        .await;
    let entries: Value = off_air.json();
    assert!(entries.as_array().unwrap().is_empty());

    let resp = server.get("/api/v1/upcoming/not-a-date").await;
    resp.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn overloaded_provider_maps_to_retryable_503() {
    let server = test_app_with(StubProvider { overloaded: true }).await;

    let resp = server.get("/api/v1/upcoming").await;
    resp.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "provider_transient");
    assert_eq!(body["error"]["details"]["retryable"], true);
}

#[tokio::test]
async fn search_resolves_genres_and_placeholder_poster() {
    let server = test_app().await;

    let resp = server.get("/api/v1/search?q=cidade").await;
    resp.assert_status_ok();
    let results: Value = resp.json();

    let hit = &results[0];
    assert_eq!(hit["titulo"], "Cidade Invisível");
    assert_eq!(hit["generos"], "Drama");
    assert_eq!(hit["anoLancamento"], 2021);
    assert_eq!(
        hit["posterUrl"],
        "https://placehold.co/500x750.png?text=Sem+Imagem"
    );

    let resp = server.get("/api/v1/search?q=%20").await;
    resp.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn feedback_accepts_and_lists() {
    let server = test_app().await;

    let resp = server
        .post("/api/v1/feedback")
        .json(&json!({ "nome": "Ana", "mensagem": "Faltou legenda no episódio 3" }))
        .await;
    resp.assert_status(axum::http::StatusCode::CREATED);

    let resp = server
        .post("/api/v1/feedback")
        .json(&json!({ "mensagem": " " }))
        .await;
    resp.assert_status(axum::http::StatusCode::BAD_REQUEST);

    let resp = server.get("/api/v1/feedback").await;
    let entries: Value = resp.json();
    assert_eq!(entries.as_array().unwrap().len(), 1);
    assert_eq!(entries[0]["mensagem"], "Faltou legenda no episódio 3");
    assert!(entries[0]["createdAt"].is_string());
}

#[tokio::test]
async fn banner_replaces_in_place() {
    let server = test_app().await;

    let resp = server.get("/api/v1/banner").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert!(body.is_null());

    server
        .put("/api/v1/banner")
        .json(&json!({ "mensagem": "Nova temporada no ar", "ativo": true }))
        .await
        .assert_status_ok();
    server
        .put("/api/v1/banner")
        .json(&json!({ "mensagem": "Manutenção domingo", "ativo": false }))
        .await
        .assert_status_ok();

    let resp = server.get("/api/v1/banner").await;
    let body: Value = resp.json();
    assert_eq!(body["mensagem"], "Manutenção domingo");
    assert_eq!(body["ativo"], false);
}
