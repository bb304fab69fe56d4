use serde::{Deserialize, Serialize};

/// Publication status stored in the `status` document field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    #[default]
    Active,
    Inactive,
}

impl ContentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog entry, either a movie or a series.
///
/// The persisted document discriminates on `contentType`, and the two
/// variants carry disjoint structural fields: a movie can never hold
/// seasons and a series can never hold top-level video sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "contentType", rename_all = "lowercase")]
pub enum ContentItem {
    Movie(MovieItem),
    Series(SeriesItem),
}

impl ContentItem {
    pub fn id(&self) -> &str {
        &self.common().id
    }

    pub fn common(&self) -> &ContentCommon {
        match self {
            Self::Movie(m) => &m.common,
            Self::Series(s) => &s.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut ContentCommon {
        match self {
            Self::Movie(m) => &mut m.common,
            Self::Series(s) => &mut s.common,
        }
    }

    /// Discriminant as stored in the document.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Movie(_) => "movie",
            Self::Series(_) => "series",
        }
    }
}

/// Fields shared by both catalog variants.
///
/// Wire names are the legacy document keys; the `id` never lives inside the
/// document (the store assigns it) and the audit timestamps are written by
/// the store alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentCommon {
    #[serde(skip)]
    pub id: String,

    #[serde(rename = "tituloOriginal")]
    pub titulo_original: String,

    #[serde(rename = "tituloLocalizado", default, skip_serializing_if = "Option::is_none")]
    pub titulo_localizado: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sinopse: Option<String>,

    /// Comma-separated genre list, free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generos: Option<String>,

    #[serde(rename = "idiomaOriginal", default, skip_serializing_if = "Option::is_none")]
    pub idioma_original: Option<String>,

    /// Comma-separated dub-language list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dublagens: Option<String>,

    #[serde(rename = "anoLancamento", default, skip_serializing_if = "Option::is_none")]
    pub ano_lancamento: Option<i32>,

    /// Average duration in minutes.
    #[serde(rename = "duracaoMedia", default, skip_serializing_if = "Option::is_none")]
    pub duracao_media: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classificacao: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualidade: Option<String>,

    #[serde(rename = "posterUrl", default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,

    #[serde(rename = "bannerUrl", default, skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,

    #[serde(rename = "destaqueHome", default)]
    pub destaque_home: bool,

    #[serde(default)]
    pub status: ContentStatus,

    /// External metadata-provider identifier; the join key the upcoming
    /// reconciler matches on.
    #[serde(rename = "tmdbId", default, skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<String>,

    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieItem {
    #[serde(flatten)]
    pub common: ContentCommon,

    #[serde(rename = "videoSources", default)]
    pub video_sources: Vec<VideoSource>,

    /// Single global subtitle URL for the movie.
    #[serde(rename = "linkLegendas", default, skip_serializing_if = "Option::is_none")]
    pub link_legendas: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesItem {
    #[serde(flatten)]
    pub common: ContentCommon,

    /// Advisory cardinality for `temporadas`; only `forms::reconcile_count`
    /// may reconcile the two.
    #[serde(rename = "totalTemporadas", default, skip_serializing_if = "Option::is_none")]
    pub total_temporadas: Option<i32>,

    #[serde(default)]
    pub temporadas: Vec<Season>,
}

/// A season of a series. Season numbers are expected unique within the
/// series but the schema does not enforce it; duplicates leave address
/// resolution undefined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Season {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "numeroTemporada")]
    pub numero_temporada: i32,

    #[serde(default)]
    pub episodios: Vec<Episode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub titulo: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,

    /// Duration in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duracao: Option<i32>,

    #[serde(rename = "videoSources", default)]
    pub video_sources: Vec<VideoSource>,

    #[serde(rename = "linkLegenda", default, skip_serializing_if = "Option::is_none")]
    pub link_legenda: Option<String>,
}

/// A named URL pointing at a playable stream for a movie or episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "serverName")]
    pub server_name: String,

    /// Empty while the operator is still typing; must be a valid URL
    /// before the item is persisted.
    #[serde(default)]
    pub url: String,
}

/// Operator feedback left through the public form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(skip)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,

    pub mensagem: String,

    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Dismissable announcement banner shown on the home page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsBanner {
    pub mensagem: String,

    #[serde(default)]
    pub ativo: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_discriminates_variants() {
        let json = serde_json::json!({
            "contentType": "movie",
            "tituloOriginal": "Central do Brasil",
            "videoSources": [{ "serverName": "Alpha", "url": "https://cdn.example/m.mp4" }]
        });
        let item: ContentItem = serde_json::from_value(json).unwrap();
        assert_eq!(item.kind(), "movie");
        match item {
            ContentItem::Movie(m) => assert_eq!(m.video_sources.len(), 1),
            ContentItem::Series(_) => panic!("expected movie"),
        }
    }

    #[test]
    fn series_arrays_default_to_empty() {
        let json = serde_json::json!({
            "contentType": "series",
            "tituloOriginal": "Cidade Invisível"
        });
        let item: ContentItem = serde_json::from_value(json).unwrap();
        match item {
            ContentItem::Series(s) => {
                assert!(s.temporadas.is_empty());
                assert_eq!(s.total_temporadas, None);
            }
            ContentItem::Movie(_) => panic!("expected series"),
        }
    }

    #[test]
    fn id_and_timestamps_never_serialize_into_the_document() {
        let mut item = ContentItem::Movie(MovieItem {
            common: ContentCommon {
                titulo_original: "X".into(),
                ..Default::default()
            },
            ..Default::default()
        });
        item.common_mut().id = "abc".into();
        item.common_mut().created_at = Some("2024-01-01T00:00:00Z".into());

        let doc = serde_json::to_value(&item).unwrap();
        assert!(doc.get("id").is_none());
        // createdAt still serializes; the persistence mapper strips it before
        // any write so the store clock stays authoritative.
        assert_eq!(doc["contentType"], "movie");
    }
}
