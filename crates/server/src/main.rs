use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let db_path = std::env::var("CINETECA_DB").unwrap_or_else(|_| "cineteca.db".to_string());
    info!(db_path = %db_path, "connecting to database");

    let pool = cineteca_store::connect(&db_path)
        .await
        .context("failed to connect to database")?;

    cineteca_store::migrate::run(&pool)
        .await
        .context("failed to run migrations")?;
    info!("migrations complete");

    let api_key = std::env::var("CINETECA_TMDB_KEY").unwrap_or_default();
    if api_key.is_empty() {
        warn!("CINETECA_TMDB_KEY not set; search and upcoming endpoints will fail until it is");
    }
    let provider = std::sync::Arc::new(cineteca_metadata::tmdb::TmdbClient::new(api_key));

    let state = cineteca_server::state::AppState {
        db: pool,
        provider,
    };
    let app = cineteca_server::routes::build_router(state);

    let bind_addr = std::env::var("CINETECA_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .context("failed to bind")?;
    info!(addr = %bind_addr, "server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
