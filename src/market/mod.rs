pub mod cmc_client;

pub use cmc_client::CmcClient;

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::PriceQuote;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// Upstream quote source. One call may carry many symbols; symbols the
/// upstream does not know are simply absent from the result map.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn fetch_quotes(
        &self,
        symbols: &[String],
        convert: &str,
    ) -> Result<HashMap<String, PriceQuote>, FeedError>;
}
