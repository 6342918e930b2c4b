//! SeaORM implementation of PosRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection,
    EntityTrait, NotSet, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, Unchanged,
};
use tokio::sync::{Mutex, MutexGuard};

use crate::domain::{
    CampusType, DomainError, DomainResult, PointOfSale, PosId, PosMutation, PosRepository,
    PosType, ValidatedPos,
};
use crate::infrastructure::database::entities::point_of_sale;

// ── Conversion helpers ──────────────────────────────────────────

fn entity_to_domain(m: point_of_sale::Model) -> DomainResult<PointOfSale> {
    let postal_code = u32::try_from(m.postal_code).map_err(|_| {
        DomainError::Storage(format!(
            "points_of_sale row {} has negative postal_code {}",
            m.id, m.postal_code
        ))
    })?;

    Ok(PointOfSale {
        id: m.id,
        name: m.name,
        description: m.description,
        pos_type: match m.pos_type {
            point_of_sale::PosType::Cafe => PosType::Cafe,
            point_of_sale::PosType::CoffeeShop => PosType::CoffeeShop,
            point_of_sale::PosType::Cafeteria => PosType::Cafeteria,
            point_of_sale::PosType::VendingMachine => PosType::VendingMachine,
            point_of_sale::PosType::Bakery => PosType::Bakery,
        },
        campus: match m.campus {
            point_of_sale::Campus::Altstadt => CampusType::Altstadt,
            point_of_sale::Campus::Bergheim => CampusType::Bergheim,
            point_of_sale::Campus::Inf => CampusType::Inf,
            point_of_sale::Campus::Central => CampusType::Central,
        },
        street: m.street,
        house_number: m.house_number,
        postal_code,
        city: m.city,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn type_to_entity(t: PosType) -> point_of_sale::PosType {
    match t {
        PosType::Cafe => point_of_sale::PosType::Cafe,
        PosType::CoffeeShop => point_of_sale::PosType::CoffeeShop,
        PosType::Cafeteria => point_of_sale::PosType::Cafeteria,
        PosType::VendingMachine => point_of_sale::PosType::VendingMachine,
        PosType::Bakery => point_of_sale::PosType::Bakery,
    }
}

fn campus_to_entity(c: CampusType) -> point_of_sale::Campus {
    match c {
        CampusType::Altstadt => point_of_sale::Campus::Altstadt,
        CampusType::Bergheim => point_of_sale::Campus::Bergheim,
        CampusType::Inf => point_of_sale::Campus::Inf,
        CampusType::Central => point_of_sale::Campus::Central,
    }
}

fn postal_code_to_entity(code: u32) -> DomainResult<i32> {
    i32::try_from(code).map_err(|_| DomainError::validation("postalCode", "out of range"))
}

// ── SeaOrmPosRepository ─────────────────────────────────────────

pub struct SeaOrmPosRepository {
    db: DatabaseConnection,
    /// SQLite has no row locks and a single writer; every write statement
    /// (insert, modify, delete_all) is serialized in-process.
    sqlite_write_gate: Option<Mutex<()>>,
}

impl SeaOrmPosRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        let sqlite_write_gate =
            (db.get_database_backend() == DatabaseBackend::Sqlite).then(|| Mutex::new(()));
        Self {
            db,
            sqlite_write_gate,
        }
    }

    async fn write_gate(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.sqlite_write_gate {
            Some(gate) => Some(gate.lock().await),
            None => None,
        }
    }
}

#[async_trait]
impl PosRepository for SeaOrmPosRepository {
    async fn insert(&self, pos: ValidatedPos, now: DateTime<Utc>) -> DomainResult<PointOfSale> {
        let model = point_of_sale::ActiveModel {
            id: NotSet,
            name: Set(pos.name),
            description: Set(pos.description),
            pos_type: Set(type_to_entity(pos.pos_type)),
            campus: Set(campus_to_entity(pos.campus)),
            street: Set(pos.street),
            house_number: Set(pos.house_number),
            postal_code: Set(postal_code_to_entity(pos.postal_code)?),
            city: Set(pos.city),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let _gate = self.write_gate().await;
        let result = model.insert(&self.db).await?;
        info!("POS saved: {} ({})", result.name, result.id);
        entity_to_domain(result)
    }

    async fn find_by_id(&self, id: PosId) -> DomainResult<Option<PointOfSale>> {
        point_of_sale::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(entity_to_domain)
            .transpose()
    }

    async fn find_all(&self) -> DomainResult<Vec<PointOfSale>> {
        let models = point_of_sale::Entity::find()
            .order_by_asc(point_of_sale::Column::CreatedAt)
            .order_by_asc(point_of_sale::Column::Id)
            .all(&self.db)
            .await?;
        models.into_iter().map(entity_to_domain).collect()
    }

    async fn find_by_name(&self, name: &str) -> DomainResult<Option<PointOfSale>> {
        point_of_sale::Entity::find()
            .filter(point_of_sale::Column::Name.eq(name))
            .order_by_asc(point_of_sale::Column::Id)
            .one(&self.db)
            .await?
            .map(entity_to_domain)
            .transpose()
    }

    async fn modify(&self, id: PosId, mutation: PosMutation) -> DomainResult<PointOfSale> {
        let _gate = self.write_gate().await;

        // Dropping `txn` without commit rolls it back, so every early return
        // below leaves the row untouched.
        let txn = self.db.begin().await?;

        let mut query = point_of_sale::Entity::find_by_id(id);
        if self.db.get_database_backend() == DatabaseBackend::Postgres {
            query = query.lock_exclusive();
        }
        let Some(existing) = query.one(&txn).await? else {
            return Err(DomainError::pos_not_found(id));
        };

        let next = mutation(entity_to_domain(existing)?)?;
        if next.id != id {
            return Err(DomainError::validation("id", "must not change on update"));
        }

        let model = point_of_sale::ActiveModel {
            id: Unchanged(id),
            name: Set(next.name),
            description: Set(next.description),
            pos_type: Set(type_to_entity(next.pos_type)),
            campus: Set(campus_to_entity(next.campus)),
            street: Set(next.street),
            house_number: Set(next.house_number),
            postal_code: Set(postal_code_to_entity(next.postal_code)?),
            city: Set(next.city),
            created_at: Unchanged(next.created_at),
            updated_at: Set(next.updated_at),
        };
        let updated = model.update(&txn).await?;
        txn.commit().await?;

        debug!("POS {} updated at {}", updated.id, updated.updated_at);
        entity_to_domain(updated)
    }

    async fn delete_all(&self) -> DomainResult<u64> {
        let _gate = self.write_gate().await;
        let result = point_of_sale::Entity::delete_many().exec(&self.db).await?;
        info!("POS table cleared: {} rows", result.rows_affected);
        Ok(result.rows_affected)
    }

    async fn ping(&self) -> DomainResult<()> {
        self.db.ping().await?;
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::infrastructure::database::testing::TempSqlite;
    use crate::infrastructure::database::{init_database, DatabaseConfig};
    use crate::infrastructure::database::migrator::Migrator;
    use crate::shared::time::now_micros;
    use sea_orm_migration::MigratorTrait;

    async fn repo() -> SeaOrmPosRepository {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            ..Default::default()
        };
        let db = init_database(&config).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SeaOrmPosRepository::new(db)
    }

    fn candidate(name: &str) -> ValidatedPos {
        ValidatedPos {
            name: name.into(),
            description: Some("Espresso bar".into()),
            pos_type: PosType::CoffeeShop,
            campus: CampusType::Bergheim,
            street: "Bergheimer Straße".into(),
            house_number: "58".into(),
            postal_code: 69115,
            city: "Heidelberg".into(),
        }
    }

    #[tokio::test]
    async fn insert_then_find_round_trips() {
        let repo = repo().await;
        let now = now_micros();
        let saved = repo.insert(candidate("Bergheim Bar"), now).await.unwrap();

        assert!(saved.id > 0);
        assert_eq!(saved.created_at, now);
        assert_eq!(saved.updated_at, now);

        let found = repo.find_by_id(saved.id).await.unwrap().unwrap();
        assert_eq!(found, saved);
        assert_eq!(found.pos_type, PosType::CoffeeShop);
        assert_eq!(found.campus, CampusType::Bergheim);
    }

    #[tokio::test]
    async fn find_missing_is_none() {
        let repo = repo().await;
        assert!(repo.find_by_id(12345).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_all_in_creation_order() {
        let repo = repo().await;
        let now = now_micros();
        let a = repo.insert(candidate("a"), now).await.unwrap();
        let b = repo.insert(candidate("b"), now).await.unwrap();
        let c = repo
            .insert(candidate("c"), now - chrono::Duration::seconds(1))
            .await
            .unwrap();

        let ids: Vec<PosId> = repo.find_all().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![c.id, a.id, b.id]);
    }

    #[tokio::test]
    async fn modify_writes_mutation_result() {
        let repo = repo().await;
        let saved = repo.insert(candidate("Bar"), now_micros()).await.unwrap();
        let later = saved.updated_at + chrono::Duration::seconds(5);

        let updated = repo
            .modify(
                saved.id,
                Box::new(move |mut p| {
                    p.city = "Mannheim".into();
                    p.updated_at = later;
                    Ok(p)
                }),
            )
            .await
            .unwrap();

        assert_eq!(updated.city, "Mannheim");
        assert_eq!(updated.created_at, saved.created_at);
        assert_eq!(repo.find_by_id(saved.id).await.unwrap().unwrap(), updated);
    }

    #[tokio::test]
    async fn failed_mutation_rolls_back() {
        let repo = repo().await;
        let saved = repo.insert(candidate("Bar"), now_micros()).await.unwrap();

        let err = repo
            .modify(
                saved.id,
                Box::new(|_| Err(DomainError::validation("campus", "rejected"))),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation { .. }));
        assert_eq!(repo.find_by_id(saved.id).await.unwrap().unwrap(), saved);
    }

    #[tokio::test]
    async fn modify_missing_is_not_found() {
        let repo = repo().await;
        let err = repo.modify(77, Box::new(|p| Ok(p))).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_all_does_not_reuse_ids() {
        let repo = repo().await;
        let first = repo.insert(candidate("one"), now_micros()).await.unwrap();
        assert_eq!(repo.delete_all().await.unwrap(), 1);
        assert!(repo.find_all().await.unwrap().is_empty());

        let second = repo.insert(candidate("two"), now_micros()).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn find_by_name_matches_exactly() {
        let repo = repo().await;
        repo.insert(candidate("Bergheim Bar"), now_micros()).await.unwrap();
        assert!(repo.find_by_name("Bergheim Bar").await.unwrap().is_some());
        assert!(repo.find_by_name("Bergheim").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn pooled_sqlite_writes_race_clear_without_lock_errors() {
        let tmp = TempSqlite::migrated(4).await;
        let repo = Arc::new(SeaOrmPosRepository::new(tmp.db.clone()));

        for round in 0..10 {
            let saved = repo.insert(candidate("Bar"), now_micros()).await.unwrap();
            let mut tasks = Vec::new();
            for i in 0..4 {
                let repo = repo.clone();
                tasks.push(tokio::spawn(async move {
                    repo.modify(
                        saved.id,
                        Box::new(move |mut p| {
                            p.house_number = i.to_string();
                            Ok(p)
                        }),
                    )
                    .await
                    .map(|_| ())
                }));
            }
            let inserter = repo.clone();
            tasks.push(tokio::spawn(async move {
                inserter.insert(candidate("Other"), now_micros()).await.map(|_| ())
            }));
            let clearer = repo.clone();
            tasks.push(tokio::spawn(async move { clearer.delete_all().await.map(|_| ()) }));

            for task in tasks {
                match task.await.unwrap() {
                    Ok(()) | Err(DomainError::NotFound { .. }) => {}
                    Err(other) => panic!("round {}: unexpected error {:?}", round, other),
                }
            }
        }
    }
}
