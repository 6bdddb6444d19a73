use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection parameters for the upstream listings API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiParams {
    /// Base URL, place id is appended as the last path segment
    pub base_url: String,
    /// Declared number of items in a full page
    pub page_size: usize,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ApiParams {
    fn default() -> Self {
        Self {
            base_url: "http://listingapi:5000/listings".to_string(),
            page_size: 20,
            timeout: Duration::from_secs(30),
        }
    }
}
