use crate::models::{CreateProduct, Product, ProductChanges, ProductStatus};
use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

/// Sea-ORM entity for the `products` table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub status: ProductStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            price: model.price,
            status: model.status,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

// New rows always start out active; the id comes from the sequence.
impl From<CreateProduct> for ActiveModel {
    fn from(input: CreateProduct) -> Self {
        let now = Utc::now();

        ActiveModel {
            id: NotSet,
            name: Set(input.name),
            price: Set(input.price),
            status: Set(ProductStatus::Existing),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }
}

impl From<ProductChanges> for ActiveModel {
    fn from(changes: ProductChanges) -> Self {
        ActiveModel {
            id: NotSet,
            name: changes.name.map_or(NotSet, Set),
            price: changes.price.map_or(NotSet, Set),
            status: changes.status.map_or(NotSet, Set),
            created_at: NotSet,
            updated_at: Set(Utc::now().into()),
        }
    }
}
