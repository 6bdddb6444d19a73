//! One-shot ingestion run: crawl every place, extract listings, upsert once.

use crate::error::UpdateError;
use crate::extract::{extract_listing, StudioRoomPolicy};
use crate::models::{Listing, RawItem, UpdateOutcome};
use crate::scrapers::PageFetcher;
use crate::store::ListingStore;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// What a failed place does to the rest of the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceFailurePolicy {
    /// Stop the run and commit nothing
    #[default]
    Abort,
    /// Drop that place's items and carry on with the next place
    Skip,
}

impl FromStr for PlaceFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(PlaceFailurePolicy::Abort),
            "skip" => Ok(PlaceFailurePolicy::Skip),
            other => Err(format!("unknown place failure policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateSettings {
    pub studio_rooms: StudioRoomPolicy,
    pub place_failure: PlaceFailurePolicy,
}

/// Listings accumulated during one run, unique on `listing_id`
struct Batch {
    update_time: DateTime<Utc>,
    studio_rooms: StudioRoomPolicy,
    seen: HashSet<i64>,
    listings: Vec<Listing>,
    items_seen: usize,
    items_rejected: usize,
}

impl Batch {
    fn new(update_time: DateTime<Utc>, studio_rooms: StudioRoomPolicy) -> Self {
        Self {
            update_time,
            studio_rooms,
            seen: HashSet::new(),
            listings: Vec::new(),
            items_seen: 0,
            items_rejected: 0,
        }
    }

    fn add(&mut self, place_id: i64, item: &RawItem) {
        self.items_seen += 1;

        let fields = match extract_listing(item, self.studio_rooms) {
            Ok(fields) => fields,
            Err(e) => {
                self.items_rejected += 1;
                let payload = serde_json::to_string(item).unwrap_or_default();
                warn!(place_id, error = %e, item = %payload, "Skipping listing");
                return;
            }
        };

        if !self.seen.insert(fields.listing_id) {
            debug!(place_id, listing_id = fields.listing_id, "Listing already in batch");
            return;
        }

        self.listings.push(fields.observed(place_id, self.update_time));
    }
}

/// Drives the page fetcher over every place and writes the result in one go.
/// At most one run is in flight per `Updater`.
pub struct Updater {
    store: Arc<dyn ListingStore>,
    fetcher: PageFetcher,
    settings: UpdateSettings,
    running: Mutex<()>,
}

impl Updater {
    pub fn new(store: Arc<dyn ListingStore>, fetcher: PageFetcher, settings: UpdateSettings) -> Self {
        Self {
            store,
            fetcher,
            settings,
            running: Mutex::new(()),
        }
    }

    pub async fn run_update(&self) -> Result<UpdateOutcome, UpdateError> {
        let _running = self.running.try_lock().map_err(|_| UpdateError::AlreadyRunning)?;

        self.store.ensure_schema().await?;
        let place_ids = self.store.list_place_ids().await?;

        // Postgres keeps microseconds; truncate so the outcome matches stored rows
        let update_time = Utc::now().trunc_subsecs(6);
        info!(
            places = place_ids.len(),
            source = self.fetcher.source_name(),
            %update_time,
            "Starting listings update"
        );

        let mut batch = Batch::new(update_time, self.settings.studio_rooms);
        let mut places_crawled = 0usize;
        let mut places_skipped = 0usize;

        for place_id in place_ids {
            let items = match self.fetcher.collect_place(place_id).await {
                Ok(items) => items,
                Err(e) => match self.settings.place_failure {
                    PlaceFailurePolicy::Abort => {
                        error!(place_id, error = %e, "Place crawl failed, aborting update");
                        return Err(e.into());
                    }
                    PlaceFailurePolicy::Skip => {
                        warn!(place_id, error = %e, "Place crawl failed, skipping place");
                        places_skipped += 1;
                        continue;
                    }
                },
            };

            for item in &items {
                batch.add(place_id, item);
            }
            places_crawled += 1;
            info!(place_id, items = items.len(), "Place crawled");
        }

        let listings_upserted = if batch.listings.is_empty() {
            debug!("Nothing to upsert");
            0
        } else {
            self.store.upsert_listings(&batch.listings).await?
        };

        info!(
            listings_upserted,
            places_crawled,
            places_skipped,
            items_seen = batch.items_seen,
            items_rejected = batch.items_rejected,
            "Listings update done"
        );

        Ok(UpdateOutcome {
            listings_upserted,
            places_crawled,
            places_skipped,
            items_seen: batch.items_seen,
            items_rejected: batch.items_rejected,
            update_time,
        })
    }
}
