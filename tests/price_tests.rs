use chartbot::services::prices::{normalize_symbol, PriceService, DEFAULT_CACHE_TTL_SECS};

fn mock_service() -> PriceService {
    // No feed configured: quotes are synthesized and cached like real ones.
    PriceService::new(None, DEFAULT_CACHE_TTL_SECS)
}

#[tokio::test]
async fn test_mock_quote_served_and_cached() {
    let service = mock_service();

    let first = service
        .get_crypto_price("BTCUSDT", "USD", 300)
        .await
        .expect("mock mode always yields a quote");
    assert_eq!(first.symbol, "BTC");
    assert_eq!(first.currency, "USD");
    assert!(first.price > 0.0);

    // The pair symbol and the base symbol resolve to the same cache entry.
    let second = service.get_crypto_price("BTC", "USD", 300).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_multiple_mock_quotes_keyed_by_symbol() {
    let service = mock_service();

    let symbols: Vec<String> = ["BTC", "ETH", "NEWCOIN"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let result = service
        .get_multiple_crypto_prices(&symbols, "USD", 300)
        .await;

    assert_eq!(result.len(), 3);
    for symbol in &symbols {
        assert_eq!(&result[symbol].symbol, symbol);
    }

    // A repeat lookup is served from cache with identical quotes.
    let again = service
        .get_multiple_crypto_prices(&symbols, "USD", 300)
        .await;
    assert_eq!(again, result);
}

#[tokio::test]
async fn test_different_currencies_are_distinct_entries() {
    let service = mock_service();

    let usd = service.get_crypto_price("BTC", "USD", 300).await.unwrap();
    let eur = service.get_crypto_price("BTC", "EUR", 300).await.unwrap();

    assert_eq!(usd.currency, "USD");
    assert_eq!(eur.currency, "EUR");
}

#[tokio::test]
async fn test_clear_cache_empties_all_entries() {
    let service = mock_service();

    let before = service.get_crypto_price("BTC", "USD", 300).await.unwrap();
    service.clear_price_cache().await;
    let after = service.get_crypto_price("BTC", "USD", 300).await.unwrap();

    // Freshly synthesized quote, not the cached one (prices are random
    // floats, a collision is effectively impossible).
    assert!(before.price != after.price || before.last_updated != after.last_updated);
}

#[tokio::test]
async fn test_price_by_symbol_wraps_quote() {
    let service = mock_service();

    let (price, currency) = service.get_price_by_symbol("ETHUSDT", "USD").await;
    assert!(price.is_some());
    assert_eq!(currency, "USD");
}

#[test]
fn test_suffix_only_symbol_survives_normalization() {
    assert_eq!(normalize_symbol("USD"), "USD");
    assert_eq!(normalize_symbol("BTCUSDT"), "BTC");
}
