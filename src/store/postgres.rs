use crate::error::StoreError;
use crate::models::Listing;
use crate::store::{ListingStore, PlacePrice, PriceStatsStore};
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};
use std::time::Duration;
use tracing::{debug, info, warn};

const CREATE_LISTINGS: &str = r#"
    CREATE TABLE IF NOT EXISTS listings (
        id BIGINT PRIMARY KEY,
        place_id BIGINT NOT NULL,
        price BIGINT NOT NULL,
        area INTEGER NOT NULL,
        room_count INTEGER,
        first_seen_at TIMESTAMPTZ NOT NULL,
        last_seen_at TIMESTAMPTZ NOT NULL
    )
"#;

/// Postgres-backed store. The pool owns connection lifecycle and checks
/// connections before handing them out.
#[derive(Clone)]
pub struct PgListingStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct PlacePriceRow {
    geom: Option<String>,
    cog: String,
    price: Option<i64>,
}

impl PgListingStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        info!(max_connections, "Connected to database");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn find_listing(&self, listing_id: i64) -> Result<Option<Listing>, StoreError> {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            SELECT id, place_id, price, area, room_count, first_seen_at, last_seen_at
            FROM listings
            WHERE id = $1
            "#,
        )
        .bind(listing_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(listing)
    }

    async fn upsert_listing_tx(
        tx: &mut Transaction<'_, Postgres>,
        listing: &Listing,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO listings (id, place_id, price, area, room_count, first_seen_at, last_seen_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                last_seen_at = EXCLUDED.last_seen_at
            "#,
        )
        .bind(listing.listing_id)
        .bind(listing.place_id)
        .bind(listing.price)
        .bind(listing.area)
        .bind(listing.room_count)
        .bind(listing.first_seen_at)
        .bind(listing.last_seen_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ListingStore for PgListingStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_LISTINGS).execute(&self.pool).await?;
        debug!("listings table ready");
        Ok(())
    }

    async fn list_place_ids(&self) -> Result<Vec<i64>, StoreError> {
        let ids = sqlx::query_scalar::<_, i64>("SELECT id::BIGINT FROM geo_place ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    async fn upsert_listings(&self, batch: &[Listing]) -> Result<usize, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut submitted = 0usize;

        for listing in batch {
            Self::upsert_listing_tx(&mut tx, listing).await?;
            submitted += 1;
        }

        tx.commit().await?;
        Ok(submitted)
    }
}

#[async_trait]
impl PriceStatsStore for PgListingStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn place_prices(&self) -> Result<Vec<PlacePrice>, StoreError> {
        let rows = sqlx::query_as::<_, PlacePriceRow>(
            r#"
            SELECT
                ST_AsGeoJSON(geo_place.geom) AS geom,
                geo_place.cog::TEXT AS cog,
                (SUM(listings.price) / NULLIF(SUM(listings.area), 0))::BIGINT AS price
            FROM geo_place
            JOIN listings ON geo_place.id = listings.place_id
            GROUP BY geo_place.id, geo_place.cog, geo_place.geom
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut prices = Vec::with_capacity(rows.len());
        for row in rows {
            let (Some(geom), Some(price)) = (row.geom, row.price) else {
                continue;
            };
            match serde_json::from_str(&geom) {
                Ok(geometry) => prices.push(PlacePrice {
                    cog: row.cog,
                    geometry,
                    price,
                }),
                Err(e) => warn!(cog = %row.cog, error = %e, "Skipping place with unreadable geometry"),
            }
        }

        Ok(prices)
    }

    async fn count_in_price_band(&self, cog: &str, min: i64, max: i64) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM geo_place
            JOIN listings ON geo_place.id = listings.place_id
            WHERE geo_place.cog::TEXT = $1
              AND listings.area > 0
              AND listings.price / listings.area >= $2
              AND listings.price / listings.area < $3
            "#,
        )
        .bind(cog)
        .bind(min)
        .bind(max)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
