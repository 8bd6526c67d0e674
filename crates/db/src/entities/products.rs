//! `SeaORM` Entity for products table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tallybook_core::stock::ProductStock;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub is_service: bool,
    pub quantity: Decimal,
    pub expiry_date: Option<Date>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Stock-relevant view of the product.
    #[must_use]
    pub fn stock(&self) -> ProductStock {
        ProductStock {
            id: self.id.into(),
            name: self.name.clone(),
            is_service: self.is_service,
            quantity: self.quantity,
            expiry_date: self.expiry_date,
        }
    }
}
