mod common;

use async_trait::async_trait;
use common::{short_page, MemoryStore, ScriptedSource};
use pricemap::error::StoreError;
use pricemap::scrapers::PageFetcher;
use pricemap::store::{PlacePrice, PriceStatsStore};
use pricemap::web::{self, AppState};
use pricemap::{UpdateSettings, Updater};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::sync::Arc;

struct FixedStats;

#[async_trait]
impl PriceStatsStore for FixedStats {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn place_prices(&self) -> Result<Vec<PlacePrice>, StoreError> {
        Ok(vec![PlacePrice {
            cog: "75117".to_string(),
            geometry: json!({ "type": "MultiPolygon", "coordinates": [] }),
            price: 11_250,
        }])
    }

    async fn count_in_price_band(&self, _cog: &str, min: i64, _max: i64) -> Result<i64, StoreError> {
        Ok(if min == 10_000 { 3 } else { 0 })
    }
}

async fn serve(store: Arc<MemoryStore>, source: ScriptedSource) -> String {
    let updater = Updater::new(
        store,
        PageFetcher::new(Arc::new(source), 20),
        UpdateSettings::default(),
    );
    let app = web::router(AppState {
        updater: Arc::new(updater),
        stats: Arc::new(FixedStats),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn update_trigger_reports_listing_count() {
    let store = Arc::new(MemoryStore::with_places(&[1]));
    let base = serve(store.clone(), ScriptedSource::new().place(1, vec![short_page(1, 3)])).await;

    let response = reqwest::get(format!("{}/update_data", base)).await.unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["listings_upserted"], 3);
    assert_eq!(store.rows().len(), 3);
}

#[tokio::test]
async fn update_trigger_distinguishes_upstream_failure() {
    let store = Arc::new(MemoryStore::with_places(&[1]));
    let base = serve(store, ScriptedSource::new().place(1, vec![Err(500)])).await;

    let response = reqwest::get(format!("{}/update_data", base)).await.unwrap();

    assert_eq!(response.status().as_u16(), 502);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "upstream_unavailable");
}

#[tokio::test]
async fn update_trigger_distinguishes_storage_failure() {
    let store = Arc::new(MemoryStore::with_places(&[1]));
    store.fail_upsert.store(true, Ordering::SeqCst);
    let base = serve(store, ScriptedSource::new().place(1, vec![short_page(1, 3)])).await;

    let response = reqwest::get(format!("{}/update_data", base)).await.unwrap();

    assert_eq!(response.status().as_u16(), 503);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "storage_unavailable");
}

#[tokio::test]
async fn geoms_returns_a_feature_collection() {
    let base = serve(Arc::new(MemoryStore::default()), ScriptedSource::new()).await;

    let body: Value = reqwest::get(format!("{}/api/geoms", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["type"], "FeatureCollection");
    assert_eq!(body["features"][0]["properties"]["cog"], "75117");
    assert_eq!(body["features"][0]["properties"]["price"], 11_250);
}

#[tokio::test]
async fn get_price_returns_the_histogram() {
    let base = serve(Arc::new(MemoryStore::default()), ScriptedSource::new()).await;

    let body: Value = reqwest::get(format!("{}/api/get_price/75117", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["serie_name"], "Prix 75117");
    assert_eq!(body["volumes"], json!([0, 0, 0, 3, 0]));
    assert_eq!(body["labels"][3], "10000-14000");
}
