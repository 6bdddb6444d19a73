use crate::error::UpstreamError;
use crate::models::RawItem;
use crate::scrapers::traits::{ListingSource, PageResponse};
use crate::scrapers::types::ApiParams;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

/// HTTP client for the paginated listings API
///
/// `GET {base_url}/{place_id}?page={n}` answers 200 with a JSON array of
/// items, or 416 once `n` is past the last page.
pub struct ListingApiClient {
    client: Client,
    params: ApiParams,
}

impl ListingApiClient {
    /// Create a client against the default listings API
    pub fn new() -> Result<Self> {
        Self::with_params(ApiParams::default())
    }

    /// Create a client with custom connection parameters
    pub fn with_params(params: ApiParams) -> Result<Self> {
        let client = Client::builder()
            .timeout(params.timeout)
            .user_agent(concat!("pricemap/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, params })
    }

    pub fn params(&self) -> &ApiParams {
        &self.params
    }

    fn page_url(&self, place_id: i64) -> String {
        format!("{}/{}", self.params.base_url.trim_end_matches('/'), place_id)
    }
}

#[async_trait]
impl ListingSource for ListingApiClient {
    async fn fetch_page(&self, place_id: i64, page: u32) -> Result<PageResponse, UpstreamError> {
        let url = self.page_url(place_id);
        debug!(place_id, page, url = %url, "Fetching listings page");

        let response = self
            .client
            .get(&url)
            .query(&[("page", page)])
            .send()
            .await?;

        match response.status() {
            StatusCode::RANGE_NOT_SATISFIABLE => Ok(PageResponse::OutOfRange),
            StatusCode::OK => {
                let body = response.bytes().await?;
                let items: Vec<RawItem> =
                    serde_json::from_slice(&body).map_err(|e| UpstreamError::InvalidBody {
                        place_id,
                        page,
                        reason: e.to_string(),
                    })?;

                debug!(place_id, page, count = items.len(), "Downloaded listings page");
                Ok(PageResponse::Items(items))
            }
            status => {
                warn!(place_id, page, status = status.as_u16(), "Listings API returned unexpected status");
                Err(UpstreamError::UnexpectedStatus {
                    place_id,
                    page,
                    status: status.as_u16(),
                })
            }
        }
    }

    fn source_name(&self) -> &'static str {
        "listings-api"
    }
}
