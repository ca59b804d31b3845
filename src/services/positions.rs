use uuid::Uuid;

use crate::db::PositionRepository;
use crate::errors::PositionError;
use crate::models::{
    Platform, Position, PositionCreate, PositionStatus, PositionUpdate, PositionsSummary,
};

/// Business-rule façade over the repository: one instance per process,
/// constructed at startup and shared behind an `Arc` (no globals, so tests
/// can build their own over a fake store).
///
/// Mutating operations take the caller's `(user_id, platform)` and verify
/// ownership before touching the record; transitions out of a terminal
/// status are rejected rather than rewritten. The ownership check and the
/// subsequent write are separate round trips — two racing callers on the
/// same id resolve last-write-wins, a documented limitation.
pub struct PositionService {
    repo: PositionRepository,
}

impl PositionService {
    pub fn new(repo: PositionRepository) -> Self {
        Self { repo }
    }

    async fn fetch_owned(
        &self,
        id: Uuid,
        user_id: &str,
        platform: Platform,
    ) -> Result<Position, PositionError> {
        let position = self
            .repo
            .get_position(id)
            .await
            .ok_or(PositionError::NotFound(id))?;

        if position.user_id != user_id || position.platform != platform {
            tracing::warn!(
                position_id = %id,
                requested_by = %user_id,
                platform = %platform,
                "Ownership mismatch on position access"
            );
            return Err(PositionError::NotOwner(id));
        }
        Ok(position)
    }

    /// Validate and open a new position. The symbol is uppercased here so
    /// every stored record follows the same convention.
    pub async fn create_position(
        &self,
        mut data: PositionCreate,
    ) -> Result<Position, PositionError> {
        if !data.entry_price.is_finite() || data.entry_price <= 0.0 {
            return Err(PositionError::Invalid(format!(
                "entry_price must be positive, got {}",
                data.entry_price
            )));
        }
        data.symbol = data.symbol.trim().to_uppercase();
        if data.symbol.is_empty() {
            return Err(PositionError::Invalid("symbol must not be empty".into()));
        }

        Ok(self.repo.create_position(data).await)
    }

    /// Plain lookup, no ownership filter: read-only callers decide what to
    /// render.
    pub async fn get_position(&self, id: Uuid) -> Option<Position> {
        self.repo.get_position(id).await
    }

    /// Partial update. A status change away from a terminal state is
    /// rejected here so the close/stop guards cannot be bypassed.
    pub async fn update_position(
        &self,
        id: Uuid,
        user_id: &str,
        platform: Platform,
        update: &PositionUpdate,
    ) -> Result<Position, PositionError> {
        let position = self.fetch_owned(id, user_id, platform).await?;

        if let Some(new_status) = update.status {
            if position.status.is_terminal() && new_status != position.status {
                return Err(PositionError::AlreadyTerminal {
                    id,
                    status: position.status,
                });
            }
        }

        self.repo
            .update_position(id, update)
            .await
            .ok_or(PositionError::NotFound(id))
    }

    /// Soft-delete. A second stop on the same position is rejected with
    /// `AlreadyTerminal` instead of silently rewriting identical state.
    pub async fn stop_position(
        &self,
        id: Uuid,
        user_id: &str,
        platform: Platform,
    ) -> Result<Position, PositionError> {
        let position = self.fetch_owned(id, user_id, platform).await?;
        if position.status.is_terminal() {
            return Err(PositionError::AlreadyTerminal {
                id,
                status: position.status,
            });
        }

        self.repo
            .stop_position(id)
            .await
            .ok_or(PositionError::NotFound(id))
    }

    /// Complete the trade. `extra` carries closing details (exit notes,
    /// realized quantity, ...); its status field, if set, is ignored.
    pub async fn close_position(
        &self,
        id: Uuid,
        user_id: &str,
        platform: Platform,
        extra: &PositionUpdate,
    ) -> Result<Position, PositionError> {
        let position = self.fetch_owned(id, user_id, platform).await?;
        if position.status.is_terminal() {
            return Err(PositionError::AlreadyTerminal {
                id,
                status: position.status,
            });
        }

        self.repo
            .close_position(id, extra)
            .await
            .ok_or(PositionError::NotFound(id))
    }

    /// Permanent removal, allowed in any status — the only way to get rid
    /// of a stopped record.
    pub async fn delete_position(
        &self,
        id: Uuid,
        user_id: &str,
        platform: Platform,
    ) -> Result<(), PositionError> {
        self.fetch_owned(id, user_id, platform).await?;
        if self.repo.delete_position(id).await {
            Ok(())
        } else {
            Err(PositionError::NotFound(id))
        }
    }

    pub async fn get_user_positions(
        &self,
        user_id: &str,
        platform: Platform,
        include_stopped: bool,
    ) -> Vec<Position> {
        self.repo
            .get_user_positions(user_id, platform, include_stopped)
            .await
    }

    pub async fn get_user_active_positions(
        &self,
        user_id: &str,
        platform: Platform,
    ) -> Vec<Position> {
        self.repo.get_user_active_positions(user_id, platform).await
    }

    /// First position matching the symbol case-insensitively at the given
    /// status. "First" follows index-set order; callers must not rely on a
    /// particular tie-break.
    pub async fn get_position_by_symbol_for_user(
        &self,
        user_id: &str,
        platform: Platform,
        symbol: &str,
        status: PositionStatus,
    ) -> Option<Position> {
        let wanted = symbol.to_uppercase();
        self.repo
            .get_user_positions(user_id, platform, true)
            .await
            .into_iter()
            .find(|p| p.status == status && p.symbol.to_uppercase() == wanted)
    }

    /// Counts across all statuses, stopped included.
    pub async fn get_positions_summary(
        &self,
        user_id: &str,
        platform: Platform,
    ) -> PositionsSummary {
        let positions = self.repo.get_user_positions(user_id, platform, true).await;

        let mut summary = PositionsSummary {
            total: positions.len(),
            ..Default::default()
        };
        for position in &positions {
            match position.status {
                PositionStatus::Active => summary.active += 1,
                PositionStatus::Closed => summary.closed += 1,
                PositionStatus::Stopped => summary.stopped += 1,
            }
        }
        summary
    }
}
