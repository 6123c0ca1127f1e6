//! Order entity - Created once per checkout and never modified afterwards.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status every order is created with
pub const STATUS_PENDING: &str = "pending";

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Session whose cart produced the order
    pub session_id: String,
    /// Customer full name
    pub customer_name: String,
    /// Customer email
    pub customer_email: String,
    /// Customer phone number
    pub customer_phone: String,
    /// Free-form shipping address
    pub shipping_address: String,
    /// Sum of price × quantity over the ordered items
    pub total_amount: f64,
    /// Order status, `"pending"` on creation
    pub status: String,
    /// When the order was placed
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One order has many order items
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
