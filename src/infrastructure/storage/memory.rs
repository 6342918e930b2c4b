//! In-memory POS repository for development and testing

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::domain::{
    DomainError, DomainResult, PointOfSale, PosId, PosMutation, PosRepository, ValidatedPos,
};

/// `DashMap`-backed repository.
///
/// `modify` holds the entry's shard write lock for the whole
/// read-modify-write, which serializes concurrent updates of the same id.
pub struct InMemoryPosRepository {
    records: DashMap<PosId, PointOfSale>,
    id_counter: AtomicI32,
}

impl InMemoryPosRepository {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            id_counter: AtomicI32::new(1),
        }
    }

    #[cfg(test)]
    fn with_next_id(next: PosId) -> Self {
        Self {
            records: DashMap::new(),
            id_counter: AtomicI32::new(next),
        }
    }
}

impl Default for InMemoryPosRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PosRepository for InMemoryPosRepository {
    async fn insert(&self, pos: ValidatedPos, now: DateTime<Utc>) -> DomainResult<PointOfSale> {
        // `i32::MAX` is never handed out; the counter stops instead of wrapping.
        let id = self
            .id_counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |next| next.checked_add(1))
            .map_err(|_| DomainError::Storage("POS id sequence exhausted".into()))?;
        let record = PointOfSale {
            id,
            name: pos.name,
            description: pos.description,
            pos_type: pos.pos_type,
            campus: pos.campus,
            street: pos.street,
            house_number: pos.house_number,
            postal_code: pos.postal_code,
            city: pos.city,
            created_at: now,
            updated_at: now,
        };
        self.records.insert(id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: PosId) -> DomainResult<Option<PointOfSale>> {
        Ok(self.records.get(&id).map(|r| r.clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<PointOfSale>> {
        let mut all: Vec<PointOfSale> = self.records.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn find_by_name(&self, name: &str) -> DomainResult<Option<PointOfSale>> {
        Ok(self
            .records
            .iter()
            .filter(|e| e.name == name)
            .map(|e| e.value().clone())
            .min_by_key(|p| p.id))
    }

    async fn modify(&self, id: PosId, mutation: PosMutation) -> DomainResult<PointOfSale> {
        let mut entry = self
            .records
            .get_mut(&id)
            .ok_or_else(|| DomainError::pos_not_found(id))?;

        let next = mutation(entry.clone())?;
        if next.id != id {
            return Err(DomainError::validation("id", "must not change on update"));
        }
        *entry = next.clone();
        Ok(next)
    }

    async fn delete_all(&self) -> DomainResult<u64> {
        let mut removed = 0u64;
        self.records.retain(|_, _| {
            removed += 1;
            false
        });
        Ok(removed)
    }

    async fn ping(&self) -> DomainResult<()> {
        Ok(())
    }
}
