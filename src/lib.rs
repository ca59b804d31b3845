pub mod config;
pub mod db;
pub mod errors;
pub mod market;
pub mod metrics;
pub mod models;
pub mod services;
pub mod store;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{PositionService, PriceService};

/// Shared handles wired once at process start and injected into every
/// consumer — the process-wide coordination point for position rules and
/// price lookups.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub positions: Arc<PositionService>,
    pub prices: Arc<PriceService>,
}
