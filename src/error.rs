use thiserror::Error;

/// A single raw item could not be turned into a listing. Recoverable: the
/// item is skipped and the run goes on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("invalid listing id: {0:?}")]
    InvalidListingId(String),

    #[error("area not found")]
    AreaNotFound,

    #[error("area is zero")]
    AreaIsZero,

    #[error("price not found")]
    PriceNotFound,

    #[error("price is zero")]
    PriceIsZero,
}

/// The listings API could not be read. Fatal for the run.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected status {status} for place {place_id} page {page}")]
    UnexpectedStatus { place_id: i64, page: u32, status: u16 },

    #[error("invalid body for place {place_id} page {page}: {reason}")]
    InvalidBody {
        place_id: i64,
        page: u32,
        reason: String,
    },
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Transport(format!("request timed out: {}", err))
        } else {
            UpstreamError::Transport(err.to_string())
        }
    }
}

/// The relational store failed. Fatal for the run, nothing is committed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Failure of a whole `run_update` call
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("upstream unavailable: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("storage unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("an update is already running")]
    AlreadyRunning,
}

impl UpdateError {
    /// Short machine-readable kind, used in trigger responses
    pub fn kind(&self) -> &'static str {
        match self {
            UpdateError::Upstream(_) => "upstream_unavailable",
            UpdateError::Store(_) => "storage_unavailable",
            UpdateError::AlreadyRunning => "already_running",
        }
    }
}
