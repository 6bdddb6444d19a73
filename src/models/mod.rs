use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One listing as returned by the upstream listings API (untrusted)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawItem {
    pub listing_id: String,
    pub title: String,
    pub price: String,
}

/// Typed fields pulled out of a single raw item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingFields {
    pub listing_id: i64,
    pub price: i64,
    pub area: i32,
    pub room_count: Option<i32>,
}

impl ListingFields {
    /// Attach the place and the run timestamp to produce a storable listing
    pub fn observed(self, place_id: i64, seen_at: DateTime<Utc>) -> Listing {
        Listing {
            listing_id: self.listing_id,
            place_id,
            price: self.price,
            area: self.area,
            room_count: self.room_count,
            first_seen_at: seen_at,
            last_seen_at: seen_at,
        }
    }
}

/// Validated listing as persisted in the `listings` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Listing {
    #[sqlx(rename = "id")]
    pub listing_id: i64,
    pub place_id: i64,
    pub price: i64,
    pub area: i32,
    pub room_count: Option<i32>,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Summary of one completed ingestion run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub listings_upserted: usize,
    pub places_crawled: usize,
    pub places_skipped: usize,
    pub items_seen: usize,
    pub items_rejected: usize,
    pub update_time: DateTime<Utc>,
}
