//! Upcoming-episode reconciliation.
//!
//! Fuses the provider's "next episode to air" data with the local catalog so
//! that an upcoming episode opens the right in-catalog series at the right
//! season/episode. The feed is ephemeral and recomputed on every fetch;
//! nothing here is ever written back to the catalog.

use chrono::{Days, NaiveDate};
use tracing::warn;

use cineteca_core::entity::{
    ContentCommon, ContentItem, Episode, Season, SeriesItem,
};

use crate::provider::MetadataProvider;
use crate::tmdb::{image_url, ImageSize};
use crate::{MediaKind, ProviderError};

/// Only episodes airing within this many days of "today" are surfaced.
pub const UPCOMING_WINDOW_DAYS: u64 = 30;

/// Detail fetches are serial (no batch endpoint), so the candidate list is
/// capped to the most popular airing series.
pub const MAX_CANDIDATES: usize = 20;

/// One externally sourced "next episode to air" record. Never persisted.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingEpisode {
    pub series_provider_id: String,
    pub series_title: String,
    pub poster_path: Option<String>,
    pub season_number: i32,
    /// 1-based, as the provider reports it.
    pub episode_number: i32,
    pub air_date: NaiveDate,
    pub episode_title: Option<String>,
    pub episode_overview: Option<String>,
    pub series_overview: Option<String>,
}

/// Where to navigate inside a series for one upcoming episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeAddress {
    pub season_number: i32,
    /// 0-based index into the season's ordered episode list.
    pub episode_index: i32,
}

/// One reconciled feed record: the episode, the catalog item it resolved to
/// (local on a match, synthesized otherwise) and the navigation address.
#[derive(Debug, Clone, serde::Serialize)]
pub struct UpcomingEntry {
    pub episode: UpcomingEpisode,
    pub item: ContentItem,
    pub address: EpisodeAddress,
    /// False when `item` is a synthesized stand-in for a series the
    /// operator has not registered.
    pub matched: bool,
}

/// Fetch the time-windowed upcoming feed from the provider.
///
/// A failure of the candidate listing is the feed's failure and propagates
/// typed; a failure of one candidate's detail fetch only skips that
/// candidate, because the feed's value is "best available subset".
pub async fn fetch_upcoming(
    provider: &dyn MetadataProvider,
    today: NaiveDate,
) -> Result<Vec<UpcomingEpisode>, ProviderError> {
    let candidates = provider.on_the_air().await?;
    let horizon = today
        .checked_add_days(Days::new(UPCOMING_WINDOW_DAYS))
        .unwrap_or(today);

    let mut feed = Vec::new();
    for candidate in candidates.iter().take(MAX_CANDIDATES) {
        let details = match provider
            .fetch_details(&candidate.provider_id, MediaKind::Tv)
            .await
        {
            Ok(details) => details,
            Err(e) => {
                warn!(series_id = %candidate.provider_id, error = %e, "skipping candidate, detail fetch failed");
                continue;
            }
        };

        let Some(next) = details.next_episode_to_air else {
            continue;
        };
        let Some(air_date) = next
            .air_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        else {
            continue;
        };
        if air_date < today || air_date > horizon {
            continue;
        }

        feed.push(UpcomingEpisode {
            series_provider_id: details.provider_id.clone(),
            series_title: details.title.clone().unwrap_or_else(|| candidate.title.clone()),
            poster_path: details.poster_path.clone().or_else(|| candidate.poster_path.clone()),
            season_number: next.season_number,
            episode_number: next.episode_number,
            air_date,
            episode_title: next.name,
            episode_overview: next.overview,
            series_overview: details.overview,
        });
    }
    Ok(feed)
}

/// Match each feed record against the local catalog snapshot by exact
/// external-identifier equality, and sort by air date ascending (stable, so
/// same-day records keep their feed order).
///
/// With duplicate season numbers in a series the address still carries the
/// feed's season number; which duplicate the UI lands on is undefined.
pub fn reconcile(feed: Vec<UpcomingEpisode>, catalog: &[ContentItem]) -> Vec<UpcomingEntry> {
    let mut entries: Vec<UpcomingEntry> = feed
        .into_iter()
        .map(|episode| {
            let local = catalog.iter().find(|item| {
                matches!(item, ContentItem::Series(_))
                    && item.common().tmdb_id.as_deref()
                        == Some(episode.series_provider_id.as_str())
            });
            match local {
                Some(item) => UpcomingEntry {
                    address: EpisodeAddress {
                        season_number: episode.season_number,
                        // Provider numbering is 1-based; local episode lists
                        // are addressed by index.
                        episode_index: episode.episode_number - 1,
                    },
                    item: item.clone(),
                    matched: true,
                    episode,
                },
                None => {
                    let item = synthesize(&episode);
                    UpcomingEntry {
                        address: EpisodeAddress {
                            season_number: episode.season_number,
                            episode_index: 0,
                        },
                        item,
                        matched: false,
                        episode,
                    }
                }
            }
        })
        .collect();

    entries.sort_by_key(|entry| entry.episode.air_date);
    entries
}

/// Ephemeral stand-in for an unregistered series, carrying only what the
/// feed knows: one synthetic season holding the one upcoming episode, no
/// video sources. Must never reach the catalog repository.
fn synthesize(episode: &UpcomingEpisode) -> ContentItem {
    ContentItem::Series(SeriesItem {
        common: ContentCommon {
            id: format!("ext-{}", episode.series_provider_id),
            titulo_original: episode.series_title.clone(),
            sinopse: episode.series_overview.clone(),
            poster_url: Some(image_url(episode.poster_path.as_deref(), ImageSize::Thumb)),
            tmdb_id: Some(episode.series_provider_id.clone()),
            ..Default::default()
        },
        total_temporadas: None,
        temporadas: vec![Season {
            id: None,
            numero_temporada: episode.season_number,
            episodios: vec![Episode {
                id: None,
                titulo: episode
                    .episode_title
                    .clone()
                    .unwrap_or_else(|| format!("Episódio {}", episode.episode_number)),
                descricao: episode.episode_overview.clone(),
                duracao: None,
                video_sources: Vec::new(),
                link_legenda: None,
            }],
        }],
    })
}

/// Entries airing on one calendar day; also the calendar-highlight
/// predicate. Time of day is not modeled.
pub fn on_day<'a>(entries: &'a [UpcomingEntry], date: NaiveDate) -> Vec<&'a UpcomingEntry> {
    entries
        .iter()
        .filter(|entry| entry.episode.air_date == date)
        .collect()
}

/// Distinct air dates in the reconciled feed, ascending.
pub fn air_dates(entries: &[UpcomingEntry]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = entries.iter().map(|e| e.episode.air_date).collect();
    dates.sort();
    dates.dedup();
    dates
}
