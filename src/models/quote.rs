use serde::{Deserialize, Serialize};

/// A price snapshot for one symbol in one quote currency.
///
/// Ephemeral: cached in memory under `"<SYMBOL>:<CURRENCY>"` and replaced
/// wholesale on refresh, never partially updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub percent_change_1h: f64,
    pub percent_change_24h: f64,
    pub percent_change_7d: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
    /// Upstream's own timestamp string, passed through unparsed.
    pub last_updated: String,
    pub currency: String,
}
