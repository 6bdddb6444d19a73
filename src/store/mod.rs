pub mod postgres;

pub use postgres::PgListingStore;

use crate::error::StoreError;
use crate::models::Listing;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Relational store the ingestion run reads places from and writes listings to
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Create the listings table if it does not exist yet
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    /// Ids of every known place, read-only input to a run
    async fn list_place_ids(&self) -> Result<Vec<i64>, StoreError>;

    /// Insert new listings and refresh `last_seen_at` on known ones, all in
    /// one transaction. Returns the number of listings submitted.
    async fn upsert_listings(&self, batch: &[Listing]) -> Result<usize, StoreError>;
}

/// Average price per m² of one place, with its geometry as GeoJSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacePrice {
    pub cog: String,
    pub geometry: serde_json::Value,
    pub price: i64,
}

/// Read-side queries behind the statistics endpoints
#[async_trait]
pub trait PriceStatsStore: Send + Sync {
    /// Round-trip to the database
    async fn ping(&self) -> Result<(), StoreError>;

    async fn place_prices(&self) -> Result<Vec<PlacePrice>, StoreError>;

    /// Listings of a place (by cog) whose price per m² is in `[min, max)`
    async fn count_in_price_band(&self, cog: &str, min: i64, max: i64) -> Result<i64, StoreError>;
}
