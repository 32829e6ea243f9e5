use chrono::{DateTime, Utc};
use sea_orm::sea_query::StringLen;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use validator::Validate;

/// Lifecycle status stored in the single-character `status` column
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
pub enum ProductStatus {
    /// Visible to every catalog operation
    #[default]
    #[sea_orm(string_value = "E")]
    #[serde(rename = "E")]
    #[strum(serialize = "E")]
    Existing,
    /// Soft-deleted; only kept for history
    #[sea_orm(string_value = "D")]
    #[serde(rename = "D")]
    #[strum(serialize = "D")]
    Deleted,
}

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Storage-assigned identifier
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Existing
    }
}

/// Fields accepted when creating a product
///
/// Anything else in the incoming payload (including `id` and `status`) is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
}

/// Business fields a caller may replace on update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
}

/// Row predicate understood by [`ProductRepository`](crate::ProductRepository)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub id: Option<i32>,
    pub status: Option<ProductStatus>,
}

impl ProductFilter {
    /// Every active product
    pub fn active() -> Self {
        Self {
            id: None,
            status: Some(ProductStatus::Existing),
        }
    }

    /// The product `id`, provided it is still active
    pub fn active_by_id(id: i32) -> Self {
        Self {
            id: Some(id),
            status: Some(ProductStatus::Existing),
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.id.is_none_or(|id| product.id == id)
            && self.status.is_none_or(|status| product.status == status)
    }
}

/// Column values written by an update; `None` leaves the column untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub status: Option<ProductStatus>,
}

impl ProductChanges {
    /// Only flips the status to `D`
    pub fn soft_delete() -> Self {
        Self {
            status: Some(ProductStatus::Deleted),
            ..Default::default()
        }
    }

    pub fn apply_to(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(status) = self.status {
            product.status = status;
        }
        product.updated_at = Utc::now();
    }
}

impl From<UpdateProduct> for ProductChanges {
    fn from(update: UpdateProduct) -> Self {
        Self {
            name: update.name,
            price: update.price,
            status: None,
        }
    }
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    10
}

/// Page request
///
/// `page` is bounded by 1..=1_000_000 and `limit` by 1..=1_000, so the offset always
/// fits a Postgres bigint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Pagination {
    #[serde(default = "default_page")]
    #[validate(range(min = 1, max = 1_000_000))]
    pub page: u64,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 1_000))]
    pub limit: u64,
}

impl Pagination {
    pub fn new(page: u64, limit: u64) -> Self {
        Self { page, limit }
    }

    /// Rows to skip before this page
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub total: u64,
    pub page: u64,
    #[serde(rename = "lastPage")]
    pub last_page: u64,
}

impl PaginationMeta {
    /// `limit` must be non-zero
    pub fn new(total: u64, pagination: &Pagination) -> Self {
        Self {
            total,
            page: pagination.page,
            last_page: total.div_ceil(pagination.limit),
        }
    }
}

/// One page of results plus paging metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i32, status: ProductStatus) -> Product {
        Product {
            id,
            name: format!("product-{id}"),
            price: 10.0,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_uses_single_letter_codes() {
        assert_eq!(ProductStatus::Existing.to_string(), "E");
        assert_eq!("D".parse::<ProductStatus>().unwrap(), ProductStatus::Deleted);
        assert_eq!(serde_json::to_value(ProductStatus::Deleted).unwrap(), "D");
    }

    #[test]
    fn test_last_page_rounds_up() {
        let pagination = Pagination::new(1, 10);
        assert_eq!(PaginationMeta::new(25, &pagination).last_page, 3);
        assert_eq!(PaginationMeta::new(30, &pagination).last_page, 3);
        assert_eq!(PaginationMeta::new(0, &pagination).last_page, 0);
    }

    #[test]
    fn test_offset_from_page_and_limit() {
        assert_eq!(Pagination::new(1, 10).offset(), 0);
        assert_eq!(Pagination::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_pagination_defaults_when_fields_missing() {
        let pagination: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(pagination, Pagination::new(1, 10));
    }

    #[test]
    fn test_pagination_rejects_zero_limit() {
        assert!(Pagination::new(1, 0).validate().is_err());
        assert!(Pagination::new(0, 10).validate().is_err());
        assert!(Pagination::new(1, 1).validate().is_ok());
    }

    #[test]
    fn test_pagination_rejects_oversized_values() {
        assert!(Pagination::new(u64::MAX, 10).validate().is_err());
        assert!(Pagination::new(1, 1_001).validate().is_err());
        assert!(Pagination::new(1_000_000, 1_000).validate().is_ok());
        assert_eq!(Pagination::new(1_000_000, 1_000).offset(), 999_999_000);
    }

    #[test]
    fn test_meta_serializes_last_page_in_camel_case() {
        let meta = PaginationMeta::new(25, &Pagination::new(2, 10));
        let json = serde_json::to_value(meta).unwrap();
        assert_eq!(json, serde_json::json!({"total": 25, "page": 2, "lastPage": 3}));
    }

    #[test]
    fn test_create_product_drops_unknown_fields() {
        let input: CreateProduct = serde_json::from_value(serde_json::json!({
            "name": "Chair",
            "price": 50,
            "status": "D",
            "id": 99
        }))
        .unwrap();

        assert_eq!(
            input,
            CreateProduct {
                name: "Chair".to_string(),
                price: 50.0
            }
        );
    }

    #[test]
    fn test_create_product_validation() {
        let empty_name = CreateProduct {
            name: String::new(),
            price: 1.0,
        };
        let negative_price = CreateProduct {
            name: "Chair".to_string(),
            price: -1.0,
        };
        assert!(empty_name.validate().is_err());
        assert!(negative_price.validate().is_err());
    }

    #[test]
    fn test_update_never_carries_status() {
        let changes = ProductChanges::from(UpdateProduct {
            name: Some("Stool".to_string()),
            price: None,
        });
        assert_eq!(changes.status, None);
    }

    #[test]
    fn test_filter_matches_active_only() {
        let filter = ProductFilter::active_by_id(1);
        assert!(filter.matches(&product(1, ProductStatus::Existing)));
        assert!(!filter.matches(&product(1, ProductStatus::Deleted)));
        assert!(!filter.matches(&product(2, ProductStatus::Existing)));
        assert!(ProductFilter::default().matches(&product(7, ProductStatus::Deleted)));
    }

    #[test]
    fn test_soft_delete_changes_only_status() {
        let mut target = product(4, ProductStatus::Existing);
        ProductChanges::soft_delete().apply_to(&mut target);
        assert_eq!(target.status, ProductStatus::Deleted);
        assert_eq!(target.name, "product-4");
        assert_eq!(target.id, 4);
    }
}
