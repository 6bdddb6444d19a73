pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod scrapers;
pub mod store;
pub mod update;
pub mod web;

pub use error::{ExtractionError, StoreError, UpdateError, UpstreamError};
pub use extract::{extract_listing, StudioRoomPolicy};
pub use models::{Listing, ListingFields, RawItem, UpdateOutcome};
pub use update::{PlaceFailurePolicy, UpdateSettings, Updater};
