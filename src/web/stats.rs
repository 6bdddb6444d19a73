use crate::error::StoreError;
use crate::store::{PlacePrice, PriceStatsStore};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Price per m² bands of the histogram, lower bound inclusive
pub const PRICE_BANDS: [(i64, i64); 5] = [
    (0, 6_000),
    (6_000, 8_000),
    (8_000, 10_000),
    (10_000, 14_000),
    (14_000, 100_000),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceHistogram {
    pub serie_name: String,
    pub volumes: Vec<i64>,
    pub labels: Vec<String>,
}

pub async fn price_histogram(
    store: &dyn PriceStatsStore,
    cog: &str,
) -> Result<PriceHistogram, StoreError> {
    let mut volumes = Vec::with_capacity(PRICE_BANDS.len());
    let mut labels = Vec::with_capacity(PRICE_BANDS.len());

    for (min, max) in PRICE_BANDS {
        volumes.push(store.count_in_price_band(cog, min, max).await?);
        labels.push(format!("{}-{}", min, max));
    }

    Ok(PriceHistogram {
        serie_name: format!("Prix {}", cog),
        volumes,
        labels,
    })
}

/// GeoJSON FeatureCollection with one feature per place
pub fn feature_collection(places: Vec<PlacePrice>) -> Value {
    let features: Vec<Value> = places
        .into_iter()
        .map(|place| {
            json!({
                "type": "Feature",
                "geometry": place.geometry,
                "properties": { "cog": place.cog, "price": place.price },
            })
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features })
}
