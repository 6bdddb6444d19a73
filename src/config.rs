use crate::extract::StudioRoomPolicy;
use crate::scrapers::ApiParams;
use crate::update::{PlaceFailurePolicy, UpdateSettings};
use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub api: ApiParams,
    pub update: UpdateSettings,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = ApiParams::default();
        let page_size: usize = parse_var("LISTINGS_PAGE_SIZE", defaults.page_size)?;
        if page_size == 0 {
            return Err(anyhow!("LISTINGS_PAGE_SIZE must be at least 1"));
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 5)?,
            api: ApiParams {
                base_url: env::var("LISTINGS_API_URL").unwrap_or(defaults.base_url),
                page_size,
                timeout: Duration::from_secs(parse_var("HTTP_TIMEOUT_SECS", defaults.timeout.as_secs())?),
            },
            update: UpdateSettings {
                studio_rooms: parse_var("STUDIO_ROOM_COUNT", StudioRoomPolicy::default())?,
                place_failure: parse_var("PLACE_FAILURE_POLICY", PlaceFailurePolicy::default())?,
            },
            port: parse_var("PORT", 5000)?,
        })
    }
}

/// Parse an optional variable, falling back to `default` when unset
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow!("{} has an invalid value '{}': {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}
