use std::sync::Arc;

use metrics::counter;
use uuid::Uuid;

use crate::models::{Platform, Position, PositionCreate, PositionStatus, PositionUpdate};
use crate::store::KeyValueStore;

pub const DEFAULT_KEY_PREFIX: &str = "position";

/// Maps position CRUD onto two kinds of keys:
/// `{prefix}:<id>` holds the JSON record, `{prefix}:user:<platform>:<user_id>`
/// is a set of ids (the per-owner secondary index).
///
/// The store offers no multi-key transactions, so create writes the record
/// first and the index second: a crash between the two leaves a position
/// fetchable by id but invisible to listings, never an index entry pointing
/// at nothing that was ever valid. Listing still skips dangling ids.
#[derive(Clone)]
pub struct PositionRepository {
    store: Arc<dyn KeyValueStore>,
    prefix: String,
}

impl PositionRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    fn position_key(&self, id: Uuid) -> String {
        format!("{}:{}", self.prefix, id)
    }

    fn user_positions_key(&self, user_id: &str, platform: Platform) -> String {
        format!("{}:user:{}:{}", self.prefix, platform, user_id)
    }

    async fn save(&self, position: &Position) -> bool {
        let value = match serde_json::to_value(position) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, position_id = %position.id, "Failed to serialize position");
                return false;
            }
        };
        self.store
            .set_json(&self.position_key(position.id), &value, None)
            .await
    }

    /// Assign id and timestamps, write the record, then index it under the
    /// owner. Record first, index second — see the type-level note.
    pub async fn create_position(&self, data: PositionCreate) -> Position {
        let position = Position::new(data);

        self.save(&position).await;

        let index_key = self.user_positions_key(&position.user_id, position.platform);
        self.store
            .add_to_set(&index_key, &[position.id.to_string()])
            .await;

        counter!("positions_created_total").increment(1);
        tracing::info!(
            position_id = %position.id,
            user_id = %position.user_id,
            platform = %position.platform,
            symbol = %position.symbol,
            "Created position"
        );
        position
    }

    pub async fn get_position(&self, id: Uuid) -> Option<Position> {
        let value = self.store.get_json(&self.position_key(id)).await?;
        match serde_json::from_value(value) {
            Ok(position) => Some(position),
            Err(e) => {
                tracing::error!(error = %e, position_id = %id, "Corrupt position record");
                None
            }
        }
    }

    /// Fetch, merge only the provided fields, bump `updated_at`, rewrite.
    /// The index is untouched: ids never change.
    pub async fn update_position(&self, id: Uuid, update: &PositionUpdate) -> Option<Position> {
        let mut position = self.get_position(id).await?;
        position.apply(update);
        self.save(&position).await;

        tracing::info!(position_id = %id, user_id = %position.user_id, "Updated position");
        Some(position)
    }

    /// Soft-delete: mark the record `Stopped`. Calling this on an already
    /// stopped record harmlessly rewrites the same state; rejecting the
    /// redundant call is the service layer's job.
    pub async fn stop_position(&self, id: Uuid) -> Option<Position> {
        let mut position = self.get_position(id).await?;
        position.stop();
        self.save(&position).await;

        counter!("positions_stopped_total").increment(1);
        tracing::info!(position_id = %id, user_id = %position.user_id, "Stopped position");
        Some(position)
    }

    /// Transition to `Closed`, stamping `closed_at` on the first transition
    /// only, then merge any extra fields (e.g. exit notes).
    pub async fn close_position(&self, id: Uuid, extra: &PositionUpdate) -> Option<Position> {
        let mut position = self.get_position(id).await?;
        position.close(extra);
        self.save(&position).await;

        counter!("positions_closed_total").increment(1);
        tracing::info!(position_id = %id, user_id = %position.user_id, "Closed position");
        Some(position)
    }

    /// Permanently remove the record and prune the owner's index entry.
    /// Returns false when the record did not exist.
    pub async fn delete_position(&self, id: Uuid) -> bool {
        let Some(position) = self.get_position(id).await else {
            return false;
        };

        self.store.delete(&self.position_key(id)).await;

        let index_key = self.user_positions_key(&position.user_id, position.platform);
        self.store
            .remove_from_set(&index_key, &[id.to_string()])
            .await;

        counter!("positions_deleted_total").increment(1);
        tracing::info!(position_id = %id, user_id = %position.user_id, "Deleted position");
        true
    }

    /// All of a user's positions, in index-set order (no total order is
    /// guaranteed). Stopped positions are filtered out unless requested;
    /// index ids whose record is missing are skipped silently.
    pub async fn get_user_positions(
        &self,
        user_id: &str,
        platform: Platform,
        include_stopped: bool,
    ) -> Vec<Position> {
        let index_key = self.user_positions_key(user_id, platform);
        let ids = self.store.get_set_members(&index_key).await;

        let mut positions = Vec::with_capacity(ids.len());
        for raw_id in ids {
            let Ok(id) = raw_id.parse::<Uuid>() else {
                tracing::warn!(raw_id = %raw_id, "Non-UUID entry in position index");
                continue;
            };
            if let Some(position) = self.get_position(id).await {
                if include_stopped || position.status != PositionStatus::Stopped {
                    positions.push(position);
                }
            }
        }
        positions
    }

    pub async fn get_user_active_positions(
        &self,
        user_id: &str,
        platform: Platform,
    ) -> Vec<Position> {
        self.get_user_positions(user_id, platform, false)
            .await
            .into_iter()
            .filter(|p| p.status == PositionStatus::Active)
            .collect()
    }
}
