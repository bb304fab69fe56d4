//! Entity validation.
//!
//! Every violation reports the document field path plus a human-readable
//! message; callers surface the full list before anything is written.

use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;
use serde::Serialize;

use crate::entity::{ContentItem, Episode, Feedback, NewsBanner, Season, VideoSource};

pub const MAX_SINOPSE_CHARS: usize = 2000;
pub const MIN_ANO_LANCAMENTO: i32 = 1800;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://\S+$").expect("url regex"));

/// A single validation violation, addressed by document field path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Validate a catalog item. The `contentType` discriminant selects which
/// required-field set applies; the variant shape already guarantees that
/// movie-only and series-only fields cannot coexist.
pub fn content(item: &ContentItem) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    common_fields(item, &mut errors);

    match item {
        ContentItem::Movie(movie) => {
            video_sources("videoSources", &movie.video_sources, &mut errors);
        }
        ContentItem::Series(series) => {
            if let Some(total) = series.total_temporadas {
                if total < 0 {
                    errors.push(FieldError::new(
                        "totalTemporadas",
                        "must be zero or greater",
                    ));
                }
            }
            for (i, season) in series.temporadas.iter().enumerate() {
                season_fields(&format!("temporadas[{i}]"), season, &mut errors);
            }
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn common_fields(item: &ContentItem, errors: &mut Vec<FieldError>) {
    let common = item.common();

    if common.titulo_original.trim().is_empty() {
        errors.push(FieldError::new("tituloOriginal", "must not be empty"));
    }

    if let Some(sinopse) = &common.sinopse {
        if sinopse.chars().count() > MAX_SINOPSE_CHARS {
            errors.push(FieldError::new(
                "sinopse",
                format!("must be at most {MAX_SINOPSE_CHARS} characters"),
            ));
        }
    }

    if let Some(ano) = common.ano_lancamento {
        let max = chrono::Utc::now().year() + 10;
        if ano < MIN_ANO_LANCAMENTO || ano > max {
            errors.push(FieldError::new(
                "anoLancamento",
                format!("must be between {MIN_ANO_LANCAMENTO} and {max}"),
            ));
        }
    }

    if let Some(duracao) = common.duracao_media {
        if duracao <= 0 {
            errors.push(FieldError::new("duracaoMedia", "must be a positive number of minutes"));
        }
    }
}

fn season_fields(path: &str, season: &Season, errors: &mut Vec<FieldError>) {
    if season.numero_temporada < 1 {
        errors.push(FieldError::new(
            format!("{path}.numeroTemporada"),
            "must be 1 or greater",
        ));
    }
    for (i, episode) in season.episodios.iter().enumerate() {
        episode_fields(&format!("{path}.episodios[{i}]"), episode, errors);
    }
}

fn episode_fields(path: &str, episode: &Episode, errors: &mut Vec<FieldError>) {
    if episode.titulo.trim().is_empty() {
        errors.push(FieldError::new(format!("{path}.titulo"), "must not be empty"));
    }
    if let Some(duracao) = episode.duracao {
        if duracao <= 0 {
            errors.push(FieldError::new(
                format!("{path}.duracao"),
                "must be a positive number of minutes",
            ));
        }
    }
    video_sources(&format!("{path}.videoSources"), &episode.video_sources, errors);
}

fn video_sources(path: &str, sources: &[VideoSource], errors: &mut Vec<FieldError>) {
    for (i, source) in sources.iter().enumerate() {
        if source.server_name.trim().is_empty() {
            errors.push(FieldError::new(
                format!("{path}[{i}].serverName"),
                "must not be empty",
            ));
        }
        // An empty URL is a transient editing state and resolved before
        // persistence; anything non-empty must parse as http(s).
        if !source.url.is_empty() && !URL_RE.is_match(&source.url) {
            errors.push(FieldError::new(
                format!("{path}[{i}].url"),
                "must be empty or a valid http(s) URL",
            ));
        }
    }
}

pub fn feedback(entry: &Feedback) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    if entry.mensagem.trim().is_empty() {
        errors.push(FieldError::new("mensagem", "must not be empty"));
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

pub fn news_banner(banner: &NewsBanner) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    if banner.mensagem.trim().is_empty() {
        errors.push(FieldError::new("mensagem", "must not be empty"));
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
