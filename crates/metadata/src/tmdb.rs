//! TMDB (The Movie Database) provider client.
//!
//! Uses TMDB API v3: https://developer.themoviedb.org/docs

use std::collections::HashMap;

use tracing::debug;

use crate::provider::MetadataProvider;
use crate::{GenreTable, MediaKind, NextEpisode, ProviderError, SearchHit, TitleDetails};

const BASE_URL: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

/// Served when a title has no image path; deterministic, never a broken ref.
pub const PLACEHOLDER_IMAGE: &str = "https://placehold.co/500x750.png?text=Sem+Imagem";

/// Image resolution tiers the UI asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    /// List/calendar thumbnails.
    Thumb,
    /// Detail-page banners.
    Banner,
}

impl ImageSize {
    fn segment(self) -> &'static str {
        match self {
            Self::Thumb => "w300",
            Self::Banner => "original",
        }
    }
}

/// Absolute image URL for a provider-relative path, with a placeholder
/// fallback when the path is absent.
pub fn image_url(path: Option<&str>, size: ImageSize) -> String {
    match path {
        Some(p) if !p.is_empty() => format!("{IMAGE_BASE}/{}{p}", size.segment()),
        _ => PLACEHOLDER_IMAGE.to_string(),
    }
}

pub struct TmdbClient {
    api_key: String,
    client: reqwest::Client,
}

impl TmdbClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }

    async fn get_json(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, ProviderError> {
        let mut all_params = vec![("api_key", self.api_key.as_str())];
        all_params.extend_from_slice(params);

        let url = format!("{BASE_URL}{path}");
        debug!(url = %url, "TMDB request");

        let resp = self
            .client
            .get(&url)
            .query(&all_params)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound);
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            // 503 and the explicit marker both mean "come back shortly".
            if status == reqwest::StatusCode::SERVICE_UNAVAILABLE
                || body.to_lowercase().contains("overloaded")
            {
                return Err(ProviderError::Overloaded(format!("TMDB returned {status}")));
            }
            return Err(ProviderError::Provider(format!("TMDB returned {status}")));
        }

        resp.json()
            .await
            .map_err(|e| ProviderError::Provider(format!("parse JSON: {e}")))
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbClient {
    fn name(&self) -> &str {
        "tmdb"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ProviderError> {
        let data = self
            .get_json("/search/multi", &[("query", query)])
            .await?;
        let results = data["results"].as_array().cloned().unwrap_or_default();

        Ok(results
            .iter()
            .filter_map(parse_search_hit)
            .take(20)
            .collect())
    }

    async fn fetch_details(
        &self,
        provider_id: &str,
        kind: MediaKind,
    ) -> Result<TitleDetails, ProviderError> {
        let data = self
            .get_json(&format!("/{}/{provider_id}", kind.as_str()), &[])
            .await?;
        Ok(parse_details(&data, kind))
    }

    async fn on_the_air(&self) -> Result<Vec<SearchHit>, ProviderError> {
        let data = self.get_json("/tv/on_the_air", &[("page", "1")]).await?;
        let results = data["results"].as_array().cloned().unwrap_or_default();

        let mut hits: Vec<SearchHit> = results
            .iter()
            .filter_map(|r| parse_media_hit(r, MediaKind::Tv))
            .collect();
        hits.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));
        Ok(hits)
    }

    async fn genre_table(&self) -> Result<GenreTable, ProviderError> {
        let mut names = HashMap::new();
        for path in ["/genre/movie/list", "/genre/tv/list"] {
            let data = self.get_json(path, &[]).await?;
            if let Some(genres) = data["genres"].as_array() {
                for genre in genres {
                    if let (Some(id), Some(name)) = (genre["id"].as_i64(), genre["name"].as_str()) {
                        names.insert(id, name.to_string());
                    }
                }
            }
        }
        Ok(GenreTable::new(names))
    }
}

fn parse_search_hit(r: &serde_json::Value) -> Option<SearchHit> {
    let kind = match r["media_type"].as_str() {
        Some("movie") => MediaKind::Movie,
        Some("tv") => MediaKind::Tv,
        // People and anything newer than this client get dropped.
        _ => return None,
    };
    parse_media_hit(r, kind)
}

fn parse_media_hit(r: &serde_json::Value, kind: MediaKind) -> Option<SearchHit> {
    let id = r["id"].as_u64()?;
    let (title_key, date_key) = match kind {
        MediaKind::Movie => ("title", "release_date"),
        MediaKind::Tv => ("name", "first_air_date"),
    };
    Some(SearchHit {
        provider_id: id.to_string(),
        title: r[title_key].as_str().unwrap_or("Unknown").to_string(),
        media_type: kind,
        poster_path: r["poster_path"].as_str().map(|s| s.to_string()),
        release_date: r[date_key].as_str().map(|s| s.to_string()),
        overview: r["overview"].as_str().map(|s| s.to_string()),
        genre_ids: r["genre_ids"]
            .as_array()
            .map(|ids| ids.iter().filter_map(|v| v.as_i64()).collect())
            .unwrap_or_default(),
        popularity: r["popularity"].as_f64().unwrap_or(0.0),
    })
}

fn parse_details(data: &serde_json::Value, kind: MediaKind) -> TitleDetails {
    let (title_key, date_key) = match kind {
        MediaKind::Movie => ("title", "release_date"),
        MediaKind::Tv => ("name", "first_air_date"),
    };

    let runtime = match kind {
        MediaKind::Movie => data["runtime"].as_i64(),
        MediaKind::Tv => data["episode_run_time"]
            .as_array()
            .and_then(|a| a.first())
            .and_then(|v| v.as_i64()),
    };

    TitleDetails {
        provider_id: data["id"].as_u64().unwrap_or(0).to_string(),
        title: data[title_key].as_str().map(|s| s.to_string()),
        overview: data["overview"].as_str().map(|s| s.to_string()),
        genres: data["genres"]
            .as_array()
            .map(|gs| {
                gs.iter()
                    .filter_map(|g| g["name"].as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default(),
        poster_path: data["poster_path"].as_str().map(|s| s.to_string()),
        backdrop_path: data["backdrop_path"].as_str().map(|s| s.to_string()),
        release_date: data[date_key].as_str().map(|s| s.to_string()),
        runtime_minutes: runtime.map(|r| r as i32),
        number_of_seasons: data["number_of_seasons"].as_i64().map(|n| n as i32),
        next_episode_to_air: parse_next_episode(&data["next_episode_to_air"]),
    }
}

fn parse_next_episode(data: &serde_json::Value) -> Option<NextEpisode> {
    if !data.is_object() {
        return None;
    }
    Some(NextEpisode {
        season_number: data["season_number"].as_i64().unwrap_or(0) as i32,
        episode_number: data["episode_number"].as_i64().unwrap_or(0) as i32,
        air_date: data["air_date"].as_str().map(|s| s.to_string()),
        name: data["name"].as_str().map(|s| s.to_string()),
        overview: data["overview"].as_str().map(|s| s.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_series_details_with_next_episode() {
        let json = serde_json::json!({
            "id": 62564,
            "name": "3%",
            "overview": "Um futuro dividido entre escassez e privilégio.",
            "first_air_date": "2016-11-25",
            "episode_run_time": [45],
            "number_of_seasons": 4,
            "poster_path": "/tres.jpg",
            "genres": [{ "id": 18, "name": "Drama" }],
            "next_episode_to_air": {
                "season_number": 4,
                "episode_number": 2,
                "air_date": "2024-06-14",
                "name": "Refúgio",
                "overview": "O grupo se reorganiza."
            }
        });

        let details = parse_details(&json, MediaKind::Tv);
        assert_eq!(details.provider_id, "62564");
        assert_eq!(details.title.as_deref(), Some("3%"));
        assert_eq!(details.runtime_minutes, Some(45));
        assert_eq!(details.number_of_seasons, Some(4));
        assert_eq!(details.genres, vec!["Drama"]);

        let next = details.next_episode_to_air.unwrap();
        assert_eq!(next.season_number, 4);
        assert_eq!(next.episode_number, 2);
        assert_eq!(next.air_date.as_deref(), Some("2024-06-14"));
    }

    #[test]
    fn parse_movie_details_without_next_episode() {
        let json = serde_json::json!({
            "id": 483980,
            "title": "Bacurau",
            "release_date": "2019-08-23",
            "runtime": 131
        });
        let details = parse_details(&json, MediaKind::Movie);
        assert_eq!(details.runtime_minutes, Some(131));
        assert!(details.next_episode_to_air.is_none());
        assert!(details.genres.is_empty());
    }

    #[test]
    fn multi_search_drops_people() {
        let person = serde_json::json!({ "id": 1, "media_type": "person", "name": "Alguém" });
        assert!(parse_search_hit(&person).is_none());

        let tv = serde_json::json!({
            "id": 2,
            "media_type": "tv",
            "name": "Cidade Invisível",
            "genre_ids": [18, 10765],
            "popularity": 42.5
        });
        let hit = parse_search_hit(&tv).unwrap();
        assert_eq!(hit.media_type, MediaKind::Tv);
        assert_eq!(hit.genre_ids, vec![18, 10765]);
    }

    #[test]
    fn image_url_prefixes_by_size_and_falls_back() {
        assert_eq!(
            image_url(Some("/p.jpg"), ImageSize::Thumb),
            "https://image.tmdb.org/t/p/w300/p.jpg"
        );
        assert_eq!(
            image_url(Some("/p.jpg"), ImageSize::Banner),
            "https://image.tmdb.org/t/p/original/p.jpg"
        );
        assert_eq!(image_url(None, ImageSize::Thumb), PLACEHOLDER_IMAGE);
        assert_eq!(image_url(Some(""), ImageSize::Banner), PLACEHOLDER_IMAGE);
    }
}
