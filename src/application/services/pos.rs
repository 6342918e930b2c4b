//! Point-of-sale directory service
//!
//! Owns every business rule for POS records: field validation, identity and
//! timestamp assignment, and the partial-apply update. Persistence is
//! delegated to a [`PosRepository`], which provides per-record atomicity.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::domain::{
    DomainError, DomainResult, NewPos, PointOfSale, PosId, PosPatch, PosRepository,
};
use crate::shared::time::{next_after, now_micros};

/// Tunable service rules
#[derive(Debug, Clone, Default)]
pub struct PosServiceConfig {
    /// Reject a create/update whose name is already used by another record.
    pub unique_names: bool,
}

/// Service for POS directory operations
pub struct PosService {
    repo: Arc<dyn PosRepository>,
    config: PosServiceConfig,
    /// Held from the name lookup until the write lands when names are unique.
    name_gate: Mutex<()>,
}

impl PosService {
    pub fn new(repo: Arc<dyn PosRepository>, config: PosServiceConfig) -> Self {
        Self {
            repo,
            config,
            name_gate: Mutex::new(()),
        }
    }

    /// Validate and persist a new record; `created_at == updated_at`.
    pub async fn create(&self, candidate: NewPos) -> DomainResult<PointOfSale> {
        let validated = candidate.validate()?;

        let _names = if self.config.unique_names {
            Some(self.claim_name(&validated.name, None).await?)
        } else {
            None
        };

        let pos = self.repo.insert(validated, now_micros()).await?;
        info!(pos_id = pos.id, name = %pos.name, pos_type = %pos.pos_type, "POS created");
        Ok(pos)
    }

    /// All records in creation order.
    pub async fn retrieve_all(&self) -> DomainResult<Vec<PointOfSale>> {
        let all = self.repo.find_all().await?;
        debug!(count = all.len(), "POS list retrieved");
        Ok(all)
    }

    pub async fn retrieve_by_id(&self, id: PosId) -> DomainResult<PointOfSale> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::pos_not_found(id))
    }

    /// Overlay `patch` on the stored record.
    ///
    /// The patch is validated before storage is touched; the merge itself runs
    /// inside the repository's atomic read-modify-write so it is computed from
    /// the current stored version, never from a caller snapshot.
    pub async fn update(&self, id: PosId, patch: PosPatch) -> DomainResult<PointOfSale> {
        let patch = patch.validate()?;
        if patch.is_empty() {
            debug!(pos_id = id, "Empty overlay, only updated_at advances");
        }

        let _names = match &patch.name {
            Some(name) if self.config.unique_names => Some(self.claim_name(name, Some(id)).await?),
            _ => None,
        };

        let updated = self
            .repo
            .modify(
                id,
                Box::new(move |current| {
                    let now = next_after(current.updated_at);
                    Ok(current.apply(&patch, now))
                }),
            )
            .await?;

        info!(pos_id = updated.id, updated_at = %updated.updated_at, "POS updated");
        Ok(updated)
    }

    /// Remove every record. Administrative reset, idempotent.
    pub async fn clear(&self) -> DomainResult<()> {
        let removed = self.repo.delete_all().await?;
        info!(removed, "POS directory cleared");
        Ok(())
    }

    /// Liveness of the backing store, for health checks.
    pub async fn storage_ping(&self) -> DomainResult<()> {
        self.repo.ping().await
    }

    /// Take the name gate and check `name` is not used by another record.
    /// The caller keeps the guard until its write has been stored.
    async fn claim_name(
        &self,
        name: &str,
        own_id: Option<PosId>,
    ) -> DomainResult<MutexGuard<'_, ()>> {
        let guard = self.name_gate.lock().await;
        match self.repo.find_by_name(name).await? {
            Some(existing) if Some(existing.id) != own_id => Err(DomainError::Conflict(format!(
                "POS named '{}' already exists (id={})",
                name, existing.id
            ))),
            _ => Ok(guard),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
