use anyhow::{Context, Result};
use pricemap::config::Config;
use pricemap::scrapers::{ListingApiClient, PageFetcher};
use pricemap::store::PgListingStore;
use pricemap::web::{self, AppState};
use pricemap::Updater;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pricemap=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Pricemap - listings ingestion and price statistics");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        api = %config.api.base_url,
        page_size = config.api.page_size,
        studio_rooms = ?config.update.studio_rooms,
        place_failure = ?config.update.place_failure,
        "Configuration loaded"
    );

    let store = PgListingStore::connect(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to connect to database")?;
    let store = Arc::new(store);

    let client = ListingApiClient::with_params(config.api.clone())?;
    let fetcher = PageFetcher::new(Arc::new(client), config.api.page_size);
    let updater = Updater::new(store.clone(), fetcher, config.update);

    // `pricemap update` runs one ingestion and exits, otherwise serve HTTP
    if std::env::args().nth(1).as_deref() == Some("update") {
        let outcome = updater.run_update().await?;
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let app = web::router(AppState {
        updater: Arc::new(updater),
        stats: store,
    });

    let addr = format!("0.0.0.0:{}", config.port);
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
