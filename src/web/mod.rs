//! Thin HTTP layer: the update trigger and the price statistics endpoints.

pub mod stats;

use crate::error::{StoreError, UpdateError};
use crate::models::UpdateOutcome;
use crate::store::PriceStatsStore;
use crate::update::Updater;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

pub use stats::{PriceHistogram, PRICE_BANDS};

#[derive(Clone)]
pub struct AppState {
    pub updater: Arc<Updater>,
    pub stats: Arc<dyn PriceStatsStore>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

/// Error answer of any endpoint
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl From<UpdateError> for ApiError {
    fn from(err: UpdateError) -> Self {
        let status = match err {
            UpdateError::Upstream(_) => StatusCode::BAD_GATEWAY,
            UpdateError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            UpdateError::AlreadyRunning => StatusCode::CONFLICT,
        };
        Self {
            status,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            kind: "storage_unavailable",
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/update_data", get(update_data))
        .route("/health", get(health))
        .route("/api/geoms", get(geoms))
        .route("/api/get_price/*cog", get(get_price))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn update_data(State(state): State<AppState>) -> Result<Json<UpdateOutcome>, ApiError> {
    match state.updater.run_update().await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e) => {
            error!(error = %e, kind = e.kind(), "Update failed");
            Err(e.into())
        }
    }
}

async fn health(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    state.stats.ping().await?;
    Ok("ok")
}

async fn geoms(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let places = state.stats.place_prices().await?;
    Ok(Json(stats::feature_collection(places)))
}

async fn get_price(
    State(state): State<AppState>,
    Path(cog): Path<String>,
) -> Result<Json<PriceHistogram>, ApiError> {
    let histogram = stats::price_histogram(state.stats.as_ref(), &cog).await?;
    Ok(Json(histogram))
}
