//! Product entity - Represents an item of the catalog.
//!
//! Products are only read by the cart. Each one is offered in an ordered list of
//! sizes, stored as a JSON array, and carries a stock count and a featured flag
//! used to order the catalog listing.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ordered list of sizes a product is offered in (e.g. `["S", "M", "L"]`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Sizes(pub Vec<String>);

impl Sizes {
    /// Whether `size` is one of the declared sizes.
    #[must_use]
    pub fn contains(&self, size: &str) -> bool {
        self.0.iter().any(|s| s == size)
    }
}

impl From<Vec<String>> for Sizes {
    fn from(sizes: Vec<String>) -> Self {
        Self(sizes)
    }
}

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Oversized Hoodie")
    pub name: String,
    /// Longer marketing description
    pub description: String,
    /// Unit price, always positive
    pub price: f64,
    /// Reference to the product image
    pub image_url: String,
    /// Catalog category (e.g., "tops", "outerwear")
    pub category: String,
    /// Sizes the product can be ordered in
    #[sea_orm(column_type = "Json")]
    pub sizes: Sizes,
    /// Units in stock
    pub stock: i32,
    /// Featured products are listed first
    pub featured: bool,
    /// When the product was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product appears in many cart items
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
