use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Platform, PositionStatus, PositionType};

/// A recorded trading position, owned by a `(platform, user_id)` pair.
///
/// Stored as JSON under `position:<id>`; the id is assigned once at creation
/// and never changes. `closed_at` is written exactly once, the first time the
/// status transitions to `Closed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: Uuid,
    pub user_id: String,
    pub platform: Platform,
    pub symbol: String,
    #[serde(rename = "type")]
    pub position_type: PositionType,
    pub entry_price: f64,
    pub take_profit: Option<f64>,
    pub stop_loss: Option<f64>,
    pub quantity: Option<f64>,
    pub leverage: Option<f64>,
    pub status: PositionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Position {
    /// Build a fresh `Active` position from a creation request, stamping id
    /// and timestamps.
    pub fn new(data: PositionCreate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            platform: data.platform,
            symbol: data.symbol,
            position_type: data.position_type,
            entry_price: data.entry_price,
            take_profit: data.take_profit,
            stop_loss: data.stop_loss,
            quantity: data.quantity,
            leverage: data.leverage,
            status: PositionStatus::Active,
            created_at: now,
            updated_at: now,
            closed_at: None,
            notes: data.notes,
            metadata: data.metadata,
        }
    }

    /// Merge the provided fields into the record and bump `updated_at`.
    /// If the merge moves the status to `Closed` and `closed_at` is unset,
    /// it is stamped here.
    pub fn apply(&mut self, update: &PositionUpdate) {
        if let Some(symbol) = &update.symbol {
            self.symbol = symbol.clone();
        }
        if let Some(position_type) = update.position_type {
            self.position_type = position_type;
        }
        if let Some(entry_price) = update.entry_price {
            self.entry_price = entry_price;
        }
        if let Some(take_profit) = update.take_profit {
            self.take_profit = Some(take_profit);
        }
        if let Some(stop_loss) = update.stop_loss {
            self.stop_loss = Some(stop_loss);
        }
        if let Some(quantity) = update.quantity {
            self.quantity = Some(quantity);
        }
        if let Some(leverage) = update.leverage {
            self.leverage = Some(leverage);
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(notes) = &update.notes {
            self.notes = Some(notes.clone());
        }
        if let Some(metadata) = &update.metadata {
            self.metadata = metadata.clone();
        }

        self.updated_at = Utc::now();

        if self.status == PositionStatus::Closed && self.closed_at.is_none() {
            self.closed_at = Some(Utc::now());
        }
    }

    /// Transition to `Closed`, stamping `closed_at` on the first transition
    /// only, then merge any extra fields (their status, if set, is ignored).
    pub fn close(&mut self, extra: &PositionUpdate) {
        if self.closed_at.is_none() {
            self.closed_at = Some(Utc::now());
        }
        self.status = PositionStatus::Closed;

        let mut rest = extra.clone();
        rest.status = None;
        self.apply(&rest);
    }

    /// Transition to `Stopped` (soft-delete) and bump `updated_at`.
    pub fn stop(&mut self) {
        self.status = PositionStatus::Stopped;
        self.updated_at = Utc::now();
    }
}

/// Fields a caller supplies when opening a position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionCreate {
    pub user_id: String,
    pub platform: Platform,
    pub symbol: String,
    #[serde(rename = "type")]
    pub position_type: PositionType,
    pub entry_price: f64,
    pub take_profit: Option<f64>,
    pub stop_loss: Option<f64>,
    pub quantity: Option<f64>,
    pub leverage: Option<f64>,
    pub notes: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Partial update: `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub symbol: Option<String>,
    #[serde(rename = "type")]
    pub position_type: Option<PositionType>,
    pub entry_price: Option<f64>,
    pub take_profit: Option<f64>,
    pub stop_loss: Option<f64>,
    pub quantity: Option<f64>,
    pub leverage: Option<f64>,
    pub status: Option<PositionStatus>,
    pub notes: Option<String>,
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

/// Per-user counts across all statuses, including stopped.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PositionsSummary {
    pub total: usize,
    pub active: usize,
    pub closed: usize,
    pub stopped: usize,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_create() -> PositionCreate {
        PositionCreate {
            user_id: "u1".into(),
            platform: Platform::Discord,
            symbol: "BTCUSDT".into(),
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

    #[test]
    fn test_new_position_is_active_with_timestamps() {
        let pos = Position::new(sample_create());
        assert_eq!(pos.status, PositionStatus::Active);
        assert_eq!(pos.created_at, pos.updated_at);
        assert!(pos.closed_at.is_none());
    }

    #[test]
    fn test_apply_merges_only_provided_fields() {
        let mut pos = Position::new(sample_create());
        let before = pos.entry_price;

        pos.apply(&PositionUpdate {
            take_profit: Some(60_000.0),
            ..Default::default()
        });

        assert_eq!(pos.take_profit, Some(60_000.0));
        assert_eq!(pos.entry_price, before);
        assert_eq!(pos.stop_loss, Some(48_000.0));
        assert!(pos.updated_at >= pos.created_at);
    }

    #[test]
    fn test_close_stamps_closed_at_once() {
        let mut pos = Position::new(sample_create());
        pos.close(&PositionUpdate::default());
        let first = pos.closed_at.expect("closed_at set on first close");

        pos.close(&PositionUpdate::default());
        assert_eq!(pos.closed_at, Some(first));
        assert_eq!(pos.status, PositionStatus::Closed);
    }

    #[test]
    fn test_close_ignores_status_in_extra_fields() {
        let mut pos = Position::new(sample_create());
        pos.close(&PositionUpdate {
            status: Some(PositionStatus::Active),
            notes: Some("took profit".into()),
            ..Default::default()
        });

        assert_eq!(pos.status, PositionStatus::Closed);
        assert_eq!(pos.notes.as_deref(), Some("took profit"));
    }

    #[test]
    fn test_stop_marks_stopped_without_closed_at() {
        let mut pos = Position::new(sample_create());
        pos.stop();
        assert_eq!(pos.status, PositionStatus::Stopped);
        assert!(pos.closed_at.is_none());
        assert!(pos.status.is_terminal());
    }

    #[test]
    fn test_apply_status_closed_stamps_closed_at() {
        let mut pos = Position::new(sample_create());
        pos.apply(&PositionUpdate {
            status: Some(PositionStatus::Closed),
            ..Default::default()
        });
        assert!(pos.closed_at.is_some());
    }

    #[test]
    fn test_serde_wire_format() {
        let pos = Position::new(sample_create());
        let value = serde_json::to_value(&pos).unwrap();

        assert_eq!(value["type"], "long");
        assert_eq!(value["status"], "active");
        assert_eq!(value["platform"], "discord");

        let back: Position = serde_json::from_value(value).unwrap();
        assert_eq!(back.id, pos.id);
        assert_eq!(back.symbol, pos.symbol);
        assert_eq!(back.position_type, pos.position_type);
    }
}
