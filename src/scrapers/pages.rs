use crate::error::UpstreamError;
use crate::models::RawItem;
use crate::scrapers::traits::{ListingSource, PageResponse};
use async_stream::try_stream;
use futures::{Stream, TryStreamExt};
use std::sync::Arc;
use tracing::debug;

/// Pages are numbered from 1
pub const FIRST_PAGE: u32 = 1;

/// Walks the pages of one place until the upstream runs out of data
///
/// Two signals end a place: a 416 answer, or a 200 page holding fewer
/// items than `page_size`. The short page is authoritative on its own, so a
/// source that never answers 416 still terminates.
#[derive(Clone)]
pub struct PageFetcher {
    source: Arc<dyn ListingSource>,
    page_size: usize,
}

impl PageFetcher {
    pub fn new(source: Arc<dyn ListingSource>, page_size: usize) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn source_name(&self) -> &'static str {
        self.source.source_name()
    }

    /// Lazy sequence of every item of a place. Pages are requested only as
    /// the stream is polled and the stream ends after the first error.
    pub fn fetch_pages(
        &self,
        place_id: i64,
    ) -> impl Stream<Item = Result<RawItem, UpstreamError>> + Send + '_ {
        try_stream! {
            let mut page = FIRST_PAGE;
            loop {
                match self.source.fetch_page(place_id, page).await? {
                    PageResponse::OutOfRange => {
                        debug!(place_id, page, "Page out of range, place exhausted");
                        break;
                    }
                    PageResponse::Items(items) => {
                        let count = items.len();
                        for item in items {
                            yield item;
                        }
                        if count < self.page_size {
                            debug!(place_id, page, count, "Short page, place exhausted");
                            break;
                        }
                        page += 1;
                    }
                }
            }
        }
    }

    /// Drain `fetch_pages` for one place
    pub async fn collect_place(&self, place_id: i64) -> Result<Vec<RawItem>, UpstreamError> {
        self.fetch_pages(place_id).try_collect().await
    }
}
