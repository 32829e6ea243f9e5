use async_trait::async_trait;
use database::{DatabaseError, DatabaseResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, TransactionTrait,
};

use crate::{
    entity,
    models::{CreateProduct, Product, ProductChanges, ProductFilter},
    repository::ProductRepository,
};

/// Postgres-backed ProductRepository
#[derive(Clone)]
pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn condition(filter: &ProductFilter) -> Condition {
        let mut condition = Condition::all();

        if let Some(id) = filter.id {
            condition = condition.add(entity::Column::Id.eq(id));
        }

        if let Some(status) = filter.status {
            condition = condition.add(entity::Column::Status.eq(status));
        }

        condition
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn insert(&self, input: CreateProduct) -> DatabaseResult<Product> {
        let active_model: entity::ActiveModel = input.into();
        let model = active_model.insert(&self.db).await?;

        tracing::info!(product_id = model.id, "Created product");
        Ok(model.into())
    }

    async fn count(&self, filter: ProductFilter) -> DatabaseResult<u64> {
        let total = entity::Entity::find()
            .filter(Self::condition(&filter))
            .count(&self.db)
            .await?;

        Ok(total)
    }

    async fn find_many(
        &self,
        filter: ProductFilter,
        offset: u64,
        limit: u64,
    ) -> DatabaseResult<Vec<Product>> {
        let models = entity::Entity::find()
            .filter(Self::condition(&filter))
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_first(&self, filter: ProductFilter) -> DatabaseResult<Option<Product>> {
        let model = entity::Entity::find()
            .filter(Self::condition(&filter))
            .one(&self.db)
            .await?;

        Ok(model.map(Into::into))
    }

    async fn update_first(
        &self,
        filter: ProductFilter,
        changes: ProductChanges,
    ) -> DatabaseResult<Product> {
        let id = filter.id.ok_or_else(|| {
            DatabaseError::InvalidQuery("update requires an id predicate".to_string())
        })?;

        let txn = self.db.begin().await?;

        let active_model: entity::ActiveModel = changes.into();
        let result = entity::Entity::update_many()
            .set(active_model)
            .filter(Self::condition(&filter))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(DbErr::RecordNotUpdated.into());
        }

        let model = entity::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("product {id}")))?;

        txn.commit().await?;

        tracing::info!(product_id = id, status = %model.status, "Updated product");
        Ok(model.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductStatus;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn model(id: i32, status: ProductStatus) -> entity::Model {
        let now = Utc::now().into();
        entity::Model {
            id,
            name: "Chair".to_string(),
            price: 50.0,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_returns_stored_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(1, ProductStatus::Existing)]])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let product = repo
            .insert(CreateProduct {
                name: "Chair".to_string(),
                price: 50.0,
            })
            .await
            .unwrap();

        assert_eq!(product.id, 1);
        assert_eq!(product.status, ProductStatus::Existing);
    }

    #[tokio::test]
    async fn test_find_first_maps_empty_result_to_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let found = repo.find_first(ProductFilter::active_by_id(7)).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_update_first_reports_no_match() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let err = repo
            .update_first(ProductFilter::active_by_id(1), ProductChanges::soft_delete())
            .await
            .unwrap_err();

        assert!(err.is_no_match());
    }

    #[tokio::test]
    async fn test_update_first_returns_updated_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![model(1, ProductStatus::Deleted)]])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let product = repo
            .update_first(ProductFilter::active_by_id(1), ProductChanges::soft_delete())
            .await
            .unwrap();

        assert_eq!(product.status, ProductStatus::Deleted);
    }

    #[tokio::test]
    async fn test_update_first_requires_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = PgProductRepository::new(db);

        let err = repo
            .update_first(ProductFilter::active(), ProductChanges::default())
            .await
            .unwrap_err();

        assert!(matches!(err, DatabaseError::InvalidQuery(_)));
    }
}
