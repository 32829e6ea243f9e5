//! Products Domain
//!
//! Catalog of products addressed through message commands rather than HTTP verbs.
//! Products are never hard-deleted: removal flips `status` from `E` to `D` and every
//! read or write afterwards treats the row as absent.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← Command router ({"cmd": ...} + payload)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Pagination, status scoping, error mapping
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Storage primitives (trait + Postgres/in-memory)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entity, DTOs, filters
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_products::{
//!     handlers::{self, ProductCommand},
//!     repository::InMemoryProductRepository,
//!     service::ProductService,
//! };
//!
//! # async fn run() -> Result<(), domain_products::RpcError> {
//! let service = ProductService::new(InMemoryProductRepository::new());
//!
//! let created = handlers::dispatch(
//!     &service,
//!     ProductCommand::Create,
//!     serde_json::json!({ "name": "Chair", "price": 50 }),
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{ProductError, ProductResult, RpcError};
pub use handlers::{MessagePattern, ProductCommand, dispatch};
pub use models::{
    CreateProduct, Paginated, Pagination, PaginationMeta, Product, ProductChanges, ProductFilter,
    ProductStatus, UpdateProduct,
};
pub use postgres::PgProductRepository;
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::ProductService;
