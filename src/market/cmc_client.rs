use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{FeedError, PriceFeed};
use crate::models::PriceQuote;

const CMC_API_BASE: &str = "https://pro-api.coinmarketcap.com";

/// CoinMarketCap quotes client. Only the `quotes/latest` endpoint is used;
/// symbols are batched comma-separated into a single request.
#[derive(Debug, Clone)]
pub struct CmcClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl CmcClient {
    pub fn new(http: Client, api_key: String) -> Self {
        Self {
            http,
            base_url: CMC_API_BASE.into(),
            api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct QuotesResponse {
    data: HashMap<String, CryptoEntry>,
}

#[derive(Debug, Deserialize)]
struct CryptoEntry {
    symbol: String,
    name: String,
    quote: HashMap<String, CurrencyQuote>,
}

#[derive(Debug, Deserialize)]
struct CurrencyQuote {
    price: Option<f64>,
    percent_change_1h: Option<f64>,
    percent_change_24h: Option<f64>,
    percent_change_7d: Option<f64>,
    market_cap: Option<f64>,
    volume_24h: Option<f64>,
    last_updated: Option<String>,
}

/// Flatten a quotes response into `PriceQuote`s for one convert currency.
/// Entries missing the requested currency are dropped with a warning.
fn quotes_from_response(resp: QuotesResponse, convert: &str) -> HashMap<String, PriceQuote> {
    let mut quotes = HashMap::with_capacity(resp.data.len());

    for (requested, entry) in resp.data {
        let Some(currency_quote) = entry.quote.get(convert) else {
            tracing::warn!(symbol = %requested, convert, "Currency missing in feed response");
            continue;
        };

        quotes.insert(
            requested,
            PriceQuote {
                symbol: entry.symbol.clone(),
                name: entry.name.clone(),
                price: currency_quote.price.unwrap_or_default(),
                percent_change_1h: currency_quote.percent_change_1h.unwrap_or_default(),
                percent_change_24h: currency_quote.percent_change_24h.unwrap_or_default(),
                percent_change_7d: currency_quote.percent_change_7d.unwrap_or_default(),
                market_cap: currency_quote.market_cap.unwrap_or_default(),
                volume_24h: currency_quote.volume_24h.unwrap_or_default(),
                last_updated: currency_quote.last_updated.clone().unwrap_or_default(),
                currency: convert.to_string(),
            },
        );
    }

    quotes
}

#[async_trait]
impl PriceFeed for CmcClient {
    async fn fetch_quotes(
        &self,
        symbols: &[String],
        convert: &str,
    ) -> Result<HashMap<String, PriceQuote>, FeedError> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        let url = format!("{}/v1/cryptocurrency/quotes/latest", self.base_url);
        let resp = self
            .http
            .get(&url)
            .header("X-CMC_PRO_API_KEY", &self.api_key)
            .query(&[("symbol", symbols.join(",")), ("convert", convert.into())])
            .send()
            .await?
            .error_for_status()?;

        let body: QuotesResponse = resp.json().await?;
        let quotes = quotes_from_response(body, convert);

        if quotes.is_empty() {
            return Err(FeedError::Unexpected(format!(
                "no quotes returned for {}",
                symbols.join(",")
            )));
        }
        Ok(quotes)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "data": {
            "BTC": {
                "symbol": "BTC",
                "name": "Bitcoin",
                "quote": {
                    "USD": {
                        "price": 43250.5,
                        "percent_change_1h": 0.4,
                        "percent_change_24h": -1.2,
                        "percent_change_7d": 5.8,
                        "market_cap": 845000000000.0,
                        "volume_24h": 21000000000.0,
                        "last_updated": "2024-01-10T12:00:00.000Z"
                    }
                }
            },
            "ETH": {
                "symbol": "ETH",
                "name": "Ethereum",
                "quote": {
                    "EUR": {
                        "price": 2000.0,
                        "last_updated": "2024-01-10T12:00:00.000Z"
                    }
                }
            }
        }
    }"#;

    #[test]
    fn test_parse_quotes_response() {
        let resp: QuotesResponse = serde_json::from_str(SAMPLE).unwrap();
        let quotes = quotes_from_response(resp, "USD");

        assert_eq!(quotes.len(), 1);
        let btc = &quotes["BTC"];
        assert_eq!(btc.name, "Bitcoin");
        assert_eq!(btc.price, 43250.5);
        assert_eq!(btc.currency, "USD");
        assert_eq!(btc.last_updated, "2024-01-10T12:00:00.000Z");
    }

    #[test]
    fn test_missing_currency_is_dropped() {
        let resp: QuotesResponse = serde_json::from_str(SAMPLE).unwrap();
        let quotes = quotes_from_response(resp, "EUR");

        assert_eq!(quotes.len(), 1);
        assert!(quotes.contains_key("ETH"));
        // Nullable numeric fields default to zero rather than failing.
        assert_eq!(quotes["ETH"].market_cap, 0.0);
    }
}
