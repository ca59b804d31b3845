use uuid::Uuid;

use crate::models::PositionStatus;

/// Business-rule violations surfaced to bot handlers. Infrastructure
/// failures never reach this enum: the store layer swallows them and
/// returns sentinel values (see `store`).
#[derive(Debug, thiserror::Error)]
pub enum PositionError {
    #[error("position {0} not found")]
    NotFound(Uuid),

    #[error("position {0} belongs to a different user")]
    NotOwner(Uuid),

    #[error("position {id} is already {status}")]
    AlreadyTerminal { id: Uuid, status: PositionStatus },

    #[error("invalid position data: {0}")]
    Invalid(String),
}
