use crate::error::UpstreamError;
use crate::models::RawItem;
use async_trait::async_trait;

/// Outcome of requesting one page of listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageResponse {
    /// The page exists; it may hold fewer items than a full page
    Items(Vec<RawItem>),
    /// The page number is past the last page (HTTP 416)
    OutOfRange,
}

/// Common trait for upstream listing sources
/// One call is one page request; pagination lives in `PageFetcher`
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch a single 1-indexed page of listings for a place
    async fn fetch_page(&self, place_id: i64, page: u32) -> Result<PageResponse, UpstreamError>;

    /// Get the name of the listing source
    fn source_name(&self) -> &'static str;
}
