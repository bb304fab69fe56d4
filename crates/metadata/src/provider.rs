use crate::{GenreTable, MediaKind, ProviderError, SearchHit, TitleDetails};

/// An external metadata provider that can search titles and fetch details.
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Free-text search across movies and series.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ProviderError>;

    /// Full details for one title by provider id.
    async fn fetch_details(
        &self,
        provider_id: &str,
        kind: MediaKind,
    ) -> Result<TitleDetails, ProviderError>;

    /// Currently airing series, popularity-ranked; candidate feed for the
    /// upcoming-episode reconciler.
    async fn on_the_air(&self) -> Result<Vec<SearchHit>, ProviderError>;

    /// Genre-id lookup table, fetched fresh rather than cached globally.
    async fn genre_table(&self) -> Result<GenreTable, ProviderError>;
}
