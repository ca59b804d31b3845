use std::sync::Arc;

use chartbot::config::AppConfig;
use chartbot::db::PositionRepository;
use chartbot::market::{CmcClient, PriceFeed};
use chartbot::metrics::describe_metrics;
use chartbot::services::{PositionService, PriceService};
use chartbot::store::RedisStore;
use chartbot::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    describe_metrics();

    let store = RedisStore::connect(&config.redis_url).await?;
    if !store.health_check().await {
        anyhow::bail!("Redis did not answer PING");
    }

    let repo = PositionRepository::new(Arc::new(store), config.position_key_prefix.clone());
    let positions = Arc::new(PositionService::new(repo));

    let feed: Option<Arc<dyn PriceFeed>> = config
        .cmc_api_key
        .clone()
        .map(|key| Arc::new(CmcClient::new(reqwest::Client::new(), key)) as Arc<dyn PriceFeed>);
    let prices = Arc::new(PriceService::new(feed, config.price_cache_ttl_secs));

    let state = AppState {
        config,
        positions,
        prices,
    };

    // `chartbot <user_id> <discord|telegram>` prints that user's positions
    // and summary; `chartbot price <symbol>` prints a quote; with no
    // arguments the process just reports readiness.
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => {
            tracing::info!(
                live_feed = state.config.has_price_feed(),
                "chartbot core ready"
            );
        }
        [cmd, symbol] if cmd == "price" => {
            match state
                .prices
                .get_crypto_price(symbol, "USD", state.config.price_cache_ttl_secs)
                .await
            {
                Some(quote) => println!("{}", serde_json::to_string_pretty(&quote)?),
                None => anyhow::bail!("no quote available for {symbol}"),
            }
        }
        [user_id, platform] => {
            let platform = platform
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;

            let positions = state
                .positions
                .get_user_positions(user_id, platform, true)
                .await;
            let summary = state.positions.get_positions_summary(user_id, platform).await;

            println!("{}", serde_json::to_string_pretty(&positions)?);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        _ => anyhow::bail!("usage: chartbot [<user_id> <discord|telegram>]"),
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
