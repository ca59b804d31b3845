use std::collections::HashMap;
use std::sync::Arc;

use chartbot::db::PositionRepository;
use chartbot::models::{Platform, PositionCreate, PositionType};
use chartbot::services::PositionService;
use chartbot::store::MemoryStore;

/// Repository over a fresh in-memory store, plus the raw store handle for
/// tests that need to poke at keys directly.
#[allow(dead_code)]
pub fn test_repo() -> (Arc<MemoryStore>, PositionRepository) {
    let store = Arc::new(MemoryStore::new());
    let repo = PositionRepository::new(store.clone(), "position");
    (store, repo)
}

/// Service wired over a fresh in-memory store.
#[allow(dead_code)]
pub fn test_service() -> (Arc<MemoryStore>, PositionService) {
    let (store, repo) = test_repo();
    (store, PositionService::new(repo))
}

/// A typical long position request for the given owner.
#[allow(dead_code)]
pub fn long_position(user_id: &str, platform: Platform, symbol: &str) -> PositionCreate {
    PositionCreate {
        user_id: user_id.to_string(),
        platform,
        symbol: symbol.to_string(),
        position_type: PositionType::Long,
        entry_price: 50_000.0,
        take_profit: Some(55_000.0),
        stop_loss: Some(48_000.0),
        quantity: None,
        leverage: None,
        notes: None,
        metadata: HashMap::new(),
    }
}
