#![allow(dead_code)]

use async_trait::async_trait;
use pricemap::error::{StoreError, UpstreamError};
use pricemap::models::{Listing, RawItem};
use pricemap::scrapers::{ListingSource, PageResponse};
use pricemap::store::ListingStore;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

/// In-memory listings table with all-or-nothing batch writes
#[derive(Default)]
pub struct MemoryStore {
    pub place_ids: Vec<i64>,
    rows: Mutex<BTreeMap<i64, Listing>>,
    pub fail_schema: AtomicBool,
    pub fail_upsert: AtomicBool,
}

impl MemoryStore {
    pub fn with_places(place_ids: &[i64]) -> Self {
        Self {
            place_ids: place_ids.to_vec(),
            ..Self::default()
        }
    }

    pub fn rows(&self) -> Vec<Listing> {
        self.rows.lock().unwrap().values().cloned().collect()
    }

    pub fn row(&self, listing_id: i64) -> Option<Listing> {
        self.rows.lock().unwrap().get(&listing_id).cloned()
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        if self.fail_schema.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    async fn list_place_ids(&self) -> Result<Vec<i64>, StoreError> {
        Ok(self.place_ids.clone())
    }

    async fn upsert_listings(&self, batch: &[Listing]) -> Result<usize, StoreError> {
        if self.fail_upsert.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut rows = self.rows.lock().unwrap();
        for listing in batch {
            rows.entry(listing.listing_id)
                .and_modify(|row| row.last_seen_at = listing.last_seen_at)
                .or_insert_with(|| listing.clone());
        }
        Ok(batch.len())
    }
}

/// Listing source answering from per-place page scripts.
/// `Err(status)` entries answer with that HTTP status.
#[derive(Default)]
pub struct ScriptedSource {
    places: HashMap<i64, Vec<Result<PageResponse, u16>>>,
    requests: Mutex<Vec<(i64, u32)>>,
    gate: Option<(Notify, Notify)>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every request wait for `release()` after signalling `started()`
    pub fn gated() -> Self {
        Self {
            gate: Some((Notify::new(), Notify::new())),
            ..Self::default()
        }
    }

    pub fn place(mut self, place_id: i64, pages: Vec<Result<PageResponse, u16>>) -> Self {
        self.places.insert(place_id, pages);
        self
    }

    pub fn requests(&self) -> Vec<(i64, u32)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_place(&self, place_id: i64) -> bool {
        self.requests().iter().any(|(id, _)| *id == place_id)
    }

    pub async fn started(&self) {
        if let Some((started, _)) = &self.gate {
            started.notified().await;
        }
    }

    pub fn release(&self) {
        if let Some((_, release)) = &self.gate {
            release.notify_one();
        }
    }
}

#[async_trait]
impl ListingSource for ScriptedSource {
    async fn fetch_page(&self, place_id: i64, page: u32) -> Result<PageResponse, UpstreamError> {
        self.requests.lock().unwrap().push((place_id, page));

        if let Some((started, release)) = &self.gate {
            started.notify_one();
            release.notified().await;
        }

        let pages = self.places.get(&place_id).cloned().unwrap_or_default();
        match pages.get(page as usize - 1) {
            Some(Ok(response)) => Ok(response.clone()),
            Some(Err(status)) => Err(UpstreamError::UnexpectedStatus {
                place_id,
                page,
                status: *status,
            }),
            None => Ok(PageResponse::OutOfRange),
        }
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

pub fn raw(listing_id: i64, title: &str, price: &str) -> RawItem {
    RawItem {
        listing_id: listing_id.to_string(),
        title: title.to_string(),
        price: price.to_string(),
    }
}

/// `count` valid two-room listings with ids starting at `first_id`
pub fn items(first_id: i64, count: usize) -> Vec<RawItem> {
    (0..count as i64)
        .map(|i| raw(first_id + i, "Appartement 2 pièces - 45 m²", "420 000 €"))
        .collect()
}

pub fn full_page(first_id: i64) -> Result<PageResponse, u16> {
    Ok(PageResponse::Items(items(first_id, 20)))
}

pub fn short_page(first_id: i64, count: usize) -> Result<PageResponse, u16> {
    Ok(PageResponse::Items(items(first_id, count)))
}
