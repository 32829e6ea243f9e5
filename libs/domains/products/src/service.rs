use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{
    CreateProduct, Paginated, Pagination, PaginationMeta, Product, ProductChanges, ProductFilter,
    UpdateProduct,
};
use crate::repository::ProductRepository;

/// Service layer for the product catalog
///
/// Every lookup and write is scoped to active products; a removed product is gone for good.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new product from its whitelisted fields
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<Product> {
        input.validate()?;

        let product = self.repository.insert(input).await?;
        tracing::debug!(product_id = product.id, "Product created");
        Ok(product)
    }

    /// One page of active products
    #[instrument(skip(self))]
    pub async fn list_products(&self, pagination: Pagination) -> ProductResult<Paginated<Product>> {
        pagination.validate()?;

        let total = self.repository.count(ProductFilter::active()).await?;
        let data = self
            .repository
            .find_many(ProductFilter::active(), pagination.offset(), pagination.limit)
            .await?;

        Ok(Paginated {
            data,
            meta: PaginationMeta::new(total, &pagination),
        })
    }

    /// Get an active product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i32) -> ProductResult<Product> {
        self.repository
            .find_first(ProductFilter::active_by_id(id))
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Replace the business fields of an active product
    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: i32, input: UpdateProduct) -> ProductResult<Product> {
        input.validate()?;

        self.repository
            .update_first(ProductFilter::active_by_id(id), ProductChanges::from(input))
            .await
            .map_err(|cause| {
                tracing::warn!(product_id = id, no_match = cause.is_no_match(), error = %cause, "Product update failed");
                ProductError::UpdateFailed { id, cause }
            })
    }

    /// Soft-delete an active product
    #[instrument(skip(self))]
    pub async fn remove_product(&self, id: i32) -> ProductResult<Product> {
        self.repository
            .update_first(ProductFilter::active_by_id(id), ProductChanges::soft_delete())
            .await
            .map_err(|cause| {
                tracing::warn!(product_id = id, no_match = cause.is_no_match(), error = %cause, "Product removal failed");
                ProductError::DeleteFailed { id, cause }
            })
    }
}
