//! Point-of-sale repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{PointOfSale, PosId, ValidatedPos};
use crate::shared::errors::DomainResult;

/// Read-modify-write step run by [`PosRepository::modify`] against the
/// record's current stored state. Returning an error aborts the write.
pub type PosMutation = Box<dyn FnOnce(PointOfSale) -> DomainResult<PointOfSale> + Send>;

/// Storage port for points of sale.
///
/// Every method is atomic on its own. `modify` is additionally atomic per id:
/// concurrent `modify` calls on the same id are serialized so each mutation
/// sees the result of the previous one.
#[async_trait]
pub trait PosRepository: Send + Sync {
    /// Insert a new record, assigning a fresh id that is never reused.
    async fn insert(&self, pos: ValidatedPos, now: DateTime<Utc>) -> DomainResult<PointOfSale>;
    async fn find_by_id(&self, id: PosId) -> DomainResult<Option<PointOfSale>>;
    /// All records in creation order.
    async fn find_all(&self) -> DomainResult<Vec<PointOfSale>>;
    async fn find_by_name(&self, name: &str) -> DomainResult<Option<PointOfSale>>;
    /// Fails with `NotFound` if no record has this id.
    async fn modify(&self, id: PosId, mutation: PosMutation) -> DomainResult<PointOfSale>;
    /// Remove every record. Returns the number of rows removed.
    async fn delete_all(&self) -> DomainResult<u64>;
    /// Cheap liveness probe of the backing store.
    async fn ping(&self) -> DomainResult<()>;
}
