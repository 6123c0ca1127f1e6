//! Cart item entity - One (product, size, quantity) line of a session's cart.
//!
//! Rows are scoped by `session_id`. The store keeps at most one row per
//! (`session_id`, `product_id`, `size`); see `config::database::create_tables`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cart item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cart_items")]
pub struct Model {
    /// Unique identifier for the line item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Session the line item belongs to
    pub session_id: String,
    /// Product being bought
    pub product_id: i64,
    /// Number of units, always positive
    pub quantity: i32,
    /// Chosen size, one of the product's sizes
    pub size: String,
    /// When the line item was first added
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `CartItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each cart item references one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
