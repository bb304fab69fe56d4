pub mod provider;
pub mod tmdb;
pub mod upcoming;

use std::collections::HashMap;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("provider error: {0}")]
    Provider(String),
    #[error("network error: {0}")]
    Network(String),
    /// The provider is temporarily overloaded (503 or an explicit
    /// "overloaded" marker); worth offering a retry.
    #[error("provider overloaded: {0}")]
    Overloaded(String),
    #[error("not found")]
    NotFound,
}

impl ProviderError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Overloaded(_))
    }
}

/// Media kind as the provider addresses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A text-search result from the provider.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchHit {
    pub provider_id: String,
    pub title: String,
    pub media_type: MediaKind,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub genre_ids: Vec<i64>,
    pub popularity: f64,
}

/// Full detail record for one title.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TitleDetails {
    pub provider_id: String,
    pub title: Option<String>,
    pub overview: Option<String>,
    pub genres: Vec<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub runtime_minutes: Option<i32>,
    pub number_of_seasons: Option<i32>,
    pub next_episode_to_air: Option<NextEpisode>,
}

/// The provider's "next episode to air" block on a series.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NextEpisode {
    pub season_number: i32,
    pub episode_number: i32,
    pub air_date: Option<String>,
    pub name: Option<String>,
    pub overview: Option<String>,
}

/// Genre-id to name lookup, built once per use and passed around explicitly
/// rather than memoized process-wide.
#[derive(Debug, Clone, Default)]
pub struct GenreTable {
    names: HashMap<i64, String>,
}

impl GenreTable {
    pub fn new(names: HashMap<i64, String>) -> Self {
        Self { names }
    }

    pub fn name(&self, id: i64) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Resolve a list of genre ids, dropping unknown ids.
    pub fn resolve(&self, ids: &[i64]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| self.name(*id).map(str::to_string))
            .collect()
    }
}
