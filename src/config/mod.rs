use std::env;

use crate::db::position_repo::DEFAULT_KEY_PREFIX;
use crate::services::prices::DEFAULT_CACHE_TTL_SECS;

const DEFAULT_REDIS_URL: &str = "redis://localhost:6379/0";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub redis_url: String,

    /// CoinMarketCap API key (optional — without it price lookups serve
    /// synthesized mock data).
    pub cmc_api_key: Option<String>,

    /// Default freshness window for cached quotes, in seconds.
    pub price_cache_ttl_secs: u64,

    /// Key prefix for position records and indices.
    pub position_key_prefix: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.into()),

            cmc_api_key: env::var("CMC_API_KEY").ok().filter(|k| !k.is_empty()),

            price_cache_ttl_secs: env::var("PRICE_CACHE_TTL_SECS")
                .unwrap_or_else(|_| DEFAULT_CACHE_TTL_SECS.to_string())
                .parse()?,

            position_key_prefix: env::var("POSITION_KEY_PREFIX")
                .unwrap_or_else(|_| DEFAULT_KEY_PREFIX.into()),
        })
    }

    /// Returns true when a live price feed credential is configured.
    pub fn has_price_feed(&self) -> bool {
        self.cmc_api_key.is_some()
    }
}
