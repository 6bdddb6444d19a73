//! Field extraction from loosely formatted listing text.
//!
//! Titles come in three shapes once whitespace is removed:
//! `Appartement<N>pièces-<A>m²`, `Studio-<A>m²` and `Appartement-<A>m²`.
//! Prices look like `<P>€`. Anything else is rejected, never defaulted.

use crate::error::ExtractionError;
use crate::models::{ListingFields, RawItem};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

static ROOMS_AND_AREA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Appartement(\d+)pièces-(\d+)m²$").expect("valid title pattern"));
static STUDIO_AREA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Studio-(\d+)m²$").expect("valid studio pattern"));
static AREA_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Appartement-(\d+)m²$").expect("valid area pattern"));
static PRICE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)€$").expect("valid price pattern"));

/// Room count recorded for `Studio` titles, which never state one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudioRoomPolicy {
    /// Leave the room count unknown
    #[default]
    Absent,
    /// Record a studio as a single room
    One,
}

impl StudioRoomPolicy {
    fn room_count(self) -> Option<i32> {
        match self {
            StudioRoomPolicy::Absent => None,
            StudioRoomPolicy::One => Some(1),
        }
    }
}

impl FromStr for StudioRoomPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "absent" | "none" | "null" => Ok(StudioRoomPolicy::Absent),
            "one" | "1" => Ok(StudioRoomPolicy::One),
            other => Err(format!("unknown studio room policy '{}'", other)),
        }
    }
}

/// Area and room count read from a title
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleFields {
    pub area: i32,
    pub room_count: Option<i32>,
}

/// Map one raw item to typed listing fields
pub fn extract_listing(
    item: &RawItem,
    studio: StudioRoomPolicy,
) -> Result<ListingFields, ExtractionError> {
    let listing_id = parse_listing_id(&item.listing_id)?;
    let title = parse_title(&item.title, studio)?;
    let price = parse_price(&item.price)?;

    Ok(ListingFields {
        listing_id,
        price,
        area: title.area,
        room_count: title.room_count,
    })
}

pub fn parse_listing_id(raw: &str) -> Result<i64, ExtractionError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ExtractionError::InvalidListingId(raw.to_string()))
}

/// Parse area and room count. First matching shape wins.
pub fn parse_title(raw: &str, studio: StudioRoomPolicy) -> Result<TitleFields, ExtractionError> {
    let title = strip_whitespace(raw);

    let fields = if let Some(caps) = ROOMS_AND_AREA.captures(&title) {
        TitleFields {
            area: parse_number(&caps[2]).ok_or(ExtractionError::AreaNotFound)?,
            room_count: Some(parse_number(&caps[1]).ok_or(ExtractionError::AreaNotFound)?),
        }
    } else if let Some(caps) = STUDIO_AREA.captures(&title) {
        TitleFields {
            area: parse_number(&caps[1]).ok_or(ExtractionError::AreaNotFound)?,
            room_count: studio.room_count(),
        }
    } else if let Some(caps) = AREA_ONLY.captures(&title) {
        TitleFields {
            area: parse_number(&caps[1]).ok_or(ExtractionError::AreaNotFound)?,
            room_count: None,
        }
    } else {
        return Err(ExtractionError::AreaNotFound);
    };

    if fields.area == 0 {
        return Err(ExtractionError::AreaIsZero);
    }

    Ok(fields)
}

pub fn parse_price(raw: &str) -> Result<i64, ExtractionError> {
    let price = strip_whitespace(raw);

    let amount: i64 = PRICE
        .captures(&price)
        .and_then(|caps| parse_number(&caps[1]))
        .ok_or(ExtractionError::PriceNotFound)?;

    if amount == 0 {
        return Err(ExtractionError::PriceIsZero);
    }

    Ok(amount)
}

/// Drop every Unicode whitespace char, including no-break and narrow no-break spaces
fn strip_whitespace(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

fn parse_number<T: FromStr>(digits: &str) -> Option<T> {
    digits.parse().ok()
}
