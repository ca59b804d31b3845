use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use metrics::counter;
use rand::Rng;
use tokio::sync::RwLock;

use crate::market::PriceFeed;
use crate::models::PriceQuote;

/// Default freshness window for cached quotes, in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Quote-currency suffixes stripped from pair symbols, checked in order.
const QUOTE_SUFFIXES: [&str; 4] = ["USD", "USDT", "USDC", "BUSD"];

struct CachedQuote {
    quote: PriceQuote,
    fetched_at: Instant,
}

/// TTL-bounded quote cache in front of an optional upstream feed.
///
/// Entries are never evicted; staleness is judged lazily at read time
/// against the caller's `max_age_secs`, so one map serves callers with
/// different freshness needs. Entries are replaced wholesale, and the lock
/// is never held across an upstream call, so a concurrent reader sees
/// either the old or the new complete quote.
///
/// Without a feed (no API key configured) the service synthesizes
/// range-realistic pseudo-random quotes so downstream bot flows stay
/// testable against live-looking data.
pub struct PriceService {
    feed: Option<Arc<dyn PriceFeed>>,
    default_ttl_secs: u64,
    cache: RwLock<HashMap<String, CachedQuote>>,
}

impl PriceService {
    pub fn new(feed: Option<Arc<dyn PriceFeed>>, default_ttl_secs: u64) -> Self {
        if feed.is_none() {
            tracing::warn!("No price feed configured — serving mock quote data");
        }
        Self {
            feed,
            default_ttl_secs,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn cache_key(symbol: &str, convert: &str) -> String {
        format!("{symbol}:{convert}")
    }

    async fn get_cached(&self, key: &str, max_age: Duration) -> Option<PriceQuote> {
        let cache = self.cache.read().await;
        cache
            .get(key)
            .filter(|entry| entry.fetched_at.elapsed() < max_age)
            .map(|entry| entry.quote.clone())
    }

    /// Whatever is cached, regardless of age. Best-effort fallback when the
    /// upstream is down.
    async fn get_cached_any_age(&self, key: &str) -> Option<PriceQuote> {
        let cache = self.cache.read().await;
        cache.get(key).map(|entry| entry.quote.clone())
    }

    async fn insert(&self, key: String, quote: PriceQuote) {
        let mut cache = self.cache.write().await;
        cache.insert(
            key,
            CachedQuote {
                quote,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Quote for one symbol. The symbol is normalized (uppercased, common
    /// quote-currency suffixes stripped); a cache entry younger than
    /// `max_age_secs` is returned unchanged; otherwise the feed is queried
    /// and the entry replaced. On feed failure the stale entry, if any, is
    /// served; `None` only when nothing of any age is cached.
    pub async fn get_crypto_price(
        &self,
        symbol: &str,
        convert: &str,
        max_age_secs: u64,
    ) -> Option<PriceQuote> {
        let base = normalize_symbol(symbol);
        let key = Self::cache_key(&base, convert);

        if let Some(quote) = self.get_cached(&key, Duration::from_secs(max_age_secs)).await {
            counter!("price_cache_hits_total").increment(1);
            tracing::debug!(symbol = %base, "Price cache hit");
            return Some(quote);
        }
        counter!("price_cache_misses_total").increment(1);

        let Some(feed) = &self.feed else {
            let quote = mock_quote(&base, convert);
            self.insert(key, quote.clone()).await;
            return Some(quote);
        };

        counter!("price_feed_requests_total").increment(1);
        match feed.fetch_quotes(&[base.clone()], convert).await {
            Ok(mut quotes) => match quotes.remove(&base) {
                Some(quote) => {
                    self.insert(key, quote.clone()).await;
                    Some(quote)
                }
                None => {
                    tracing::warn!(symbol = %base, "Symbol absent from feed response");
                    self.get_cached_any_age(&key).await
                }
            },
            Err(e) => {
                tracing::error!(error = %e, symbol = %base, "Price feed lookup failed");
                self.get_cached_any_age(&key).await
            }
        }
    }

    /// Quotes for many symbols at once. Symbols are uppercased and trimmed
    /// (no suffix stripping — callers pass base symbols here). Fresh cache
    /// hits are served as-is; all misses go upstream in exactly one batched
    /// call. On feed failure the partial map resolved from cache is
    /// returned rather than an error.
    pub async fn get_multiple_crypto_prices(
        &self,
        symbols: &[String],
        convert: &str,
        max_age_secs: u64,
    ) -> HashMap<String, PriceQuote> {
        let max_age = Duration::from_secs(max_age_secs);
        let mut result = HashMap::new();
        let mut misses = Vec::new();

        for raw in symbols {
            let symbol = raw.trim().to_uppercase();
            if symbol.is_empty() || result.contains_key(&symbol) || misses.contains(&symbol) {
                continue;
            }

            let key = Self::cache_key(&symbol, convert);
            match self.get_cached(&key, max_age).await {
                Some(quote) => {
                    counter!("price_cache_hits_total").increment(1);
                    result.insert(symbol, quote);
                }
                None => {
                    counter!("price_cache_misses_total").increment(1);
                    misses.push(symbol);
                }
            }
        }

        if misses.is_empty() {
            return result;
        }

        let Some(feed) = &self.feed else {
            for symbol in misses {
                let quote = mock_quote(&symbol, convert);
                self.insert(Self::cache_key(&symbol, convert), quote.clone())
                    .await;
                result.insert(symbol, quote);
            }
            return result;
        };

        counter!("price_feed_requests_total").increment(1);
        match feed.fetch_quotes(&misses, convert).await {
            Ok(mut quotes) => {
                for symbol in misses {
                    let Some(quote) = quotes.remove(&symbol) else {
                        tracing::warn!(symbol = %symbol, "Symbol absent from feed response");
                        continue;
                    };
                    self.insert(Self::cache_key(&symbol, convert), quote.clone())
                        .await;
                    result.insert(symbol, quote);
                }
                result
            }
            Err(e) => {
                tracing::error!(error = %e, "Batched price lookup failed — returning cached subset");
                result
            }
        }
    }

    /// Just the price, with the default freshness window.
    pub async fn get_price_by_symbol(&self, symbol: &str, convert: &str) -> (Option<f64>, String) {
        match self
            .get_crypto_price(symbol, convert, self.default_ttl_secs)
            .await
        {
            Some(quote) => (Some(quote.price), quote.currency),
            None => (None, convert.to_string()),
        }
    }

    /// Drop every cached entry. Used by tests and forced refreshes.
    pub async fn clear_price_cache(&self) {
        let mut cache = self.cache.write().await;
        cache.clear();
        tracing::info!("Price cache cleared");
    }

    /// Age an existing entry in place so staleness paths can be exercised
    /// without sleeping.
    #[cfg(test)]
    pub(crate) async fn backdate(&self, symbol: &str, convert: &str, age: Duration) {
        let key = Self::cache_key(symbol, convert);
        let mut cache = self.cache.write().await;
        if let Some(entry) = cache.get_mut(&key) {
            entry.fetched_at = Instant::now() - age;
        }
    }
}

/// Uppercase, trim, and strip one recognized quote-currency suffix — but
/// only when a non-empty base remains, so a coin literally named "USD"
/// survives intact.
pub fn normalize_symbol(raw: &str) -> String {
    let symbol = raw.trim().to_uppercase();
    for suffix in QUOTE_SUFFIXES {
        if symbol.len() > suffix.len() {
            if let Some(base) = symbol.strip_suffix(suffix) {
                return base.to_string();
            }
        }
    }
    symbol
}

/// Range-realistic pseudo-random quote for development without a feed
/// credential. Ranges mirror rough 2024 market levels per symbol.
fn mock_quote(symbol: &str, convert: &str) -> PriceQuote {
    counter!("price_mock_quotes_total").increment(1);

    let (low, high) = match symbol {
        "BTC" => (35_000.0, 45_000.0),
        "ETH" => (1_800.0, 2_400.0),
        "XRP" => (0.4, 0.7),
        "SOL" => (80.0, 150.0),
        "ADA" => (0.3, 0.5),
        "DOGE" => (0.05, 0.15),
        "DOT" => (5.0, 15.0),
        "MATIC" => (0.5, 1.5),
        "LTC" => (50.0, 100.0),
        "LINK" => (10.0, 20.0),
        _ => (1.0, 100.0),
    };

    let mut rng = rand::thread_rng();
    let price = rng.gen_range(low..high);

    PriceQuote {
        symbol: symbol.to_string(),
        name: format!("{symbol} Coin"),
        price,
        percent_change_1h: rng.gen_range(-5.0..5.0),
        percent_change_24h: rng.gen_range(-10.0..10.0),
        percent_change_7d: rng.gen_range(-20.0..20.0),
        market_cap: price * rng.gen_range(1_000_000.0..100_000_000.0),
        volume_24h: price * rng.gen_range(100_000.0..10_000_000.0),
        last_updated: Utc::now().to_rfc3339(),
        currency: convert.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
