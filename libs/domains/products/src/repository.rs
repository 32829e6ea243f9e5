use async_trait::async_trait;
use chrono::Utc;
use database::{DatabaseError, DatabaseResult};
use sea_orm::DbErr;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::{CreateProduct, Product, ProductChanges, ProductFilter, ProductStatus};

/// Storage accessor for the products table
///
/// Implementations own the connection and never hard-delete rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a new row with status `E` and return it with its generated id
    async fn insert(&self, input: CreateProduct) -> DatabaseResult<Product>;

    /// Count rows matching `filter`
    async fn count(&self, filter: ProductFilter) -> DatabaseResult<u64>;

    /// Fetch a window of rows matching `filter`, in storage order
    async fn find_many(
        &self,
        filter: ProductFilter,
        offset: u64,
        limit: u64,
    ) -> DatabaseResult<Vec<Product>>;

    /// Fetch the first row matching `filter`
    async fn find_first(&self, filter: ProductFilter) -> DatabaseResult<Option<Product>>;

    /// Apply `changes` to the row matching `filter` and return it
    ///
    /// `filter.id` is required. Fails with [`DbErr::RecordNotUpdated`] when nothing matches.
    async fn update_first(
        &self,
        filter: ProductFilter,
        changes: ProductChanges,
    ) -> DatabaseResult<Product>;
}

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i32, Product>,
    last_id: i32,
}

/// In-memory implementation of ProductRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    table: Arc<RwLock<Table>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn insert(&self, input: CreateProduct) -> DatabaseResult<Product> {
        let mut table = self.table.write().await;
        table.last_id += 1;

        let now = Utc::now();
        let product = Product {
            id: table.last_id,
            name: input.name,
            price: input.price,
            status: ProductStatus::Existing,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(product.id, product.clone());

        tracing::debug!(product_id = product.id, "Inserted product");
        Ok(product)
    }

    async fn count(&self, filter: ProductFilter) -> DatabaseResult<u64> {
        let table = self.table.read().await;
        Ok(table.rows.values().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn find_many(
        &self,
        filter: ProductFilter,
        offset: u64,
        limit: u64,
    ) -> DatabaseResult<Vec<Product>> {
        let table = self.table.read().await;

        Ok(table
            .rows
            .values()
            .filter(|p| filter.matches(p))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn find_first(&self, filter: ProductFilter) -> DatabaseResult<Option<Product>> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|p| filter.matches(p)).cloned())
    }

    async fn update_first(
        &self,
        filter: ProductFilter,
        changes: ProductChanges,
    ) -> DatabaseResult<Product> {
        let id = filter.id.ok_or_else(|| {
            DatabaseError::InvalidQuery("update requires an id predicate".to_string())
        })?;

        let mut table = self.table.write().await;
        let product = table
            .rows
            .get_mut(&id)
            .filter(|p| filter.matches(p))
            .ok_or(DbErr::RecordNotUpdated)?;

        changes.apply_to(product);

        tracing::debug!(product_id = id, "Updated product");
        Ok(product.clone())
    }
}
