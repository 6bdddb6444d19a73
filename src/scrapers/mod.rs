pub mod api;
pub mod pages;
pub mod traits;
pub mod types;

pub use api::ListingApiClient;
pub use pages::PageFetcher;
pub use traits::{ListingSource, PageResponse};
pub use types::ApiParams;
