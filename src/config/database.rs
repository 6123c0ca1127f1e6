//! Database configuration module for the storefront.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. On top of the generated tables a unique
//! index over (`session_id`, `product_id`, `size`) guarantees a session never holds two
//! cart lines for the same product and size; the cart relies on it for its upsert.

use crate::config::settings;
use crate::entities::{CartItem, Order, OrderItem, Product, cart_item};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Name of the unique index backing cart line merging.
pub const CART_ITEM_UNIQUE_INDEX: &str = "idx_cart_items_session_product_size";

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set. For file-backed
/// `SQLite` URLs the parent directory is created first, since `SQLite` only creates the file.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = settings::database_url();
    if let Some(parent) = sqlite_parent_dir(&database_url) {
        std::fs::create_dir_all(parent)?;
    }
    connect(&database_url).await
}

/// Directory holding the database file of a `sqlite://` URL, if it names one.
fn sqlite_parent_dir(database_url: &str) -> Option<&Path> {
    let path = database_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next()?;
    if path.is_empty() || path.starts_with(':') {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
}

/// Connects to an explicit database URL.
#[instrument(skip_all)]
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Opening database connection");
    Database::connect(database_url).await.map_err(Into::into)
}

async fn create_table_for<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all storefront tables and the cart uniqueness index if they do not exist.
///
/// Parent tables are created before the tables that reference them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table_for(db, &schema, Product).await?;
    create_table_for(db, &schema, Order).await?;
    create_table_for(db, &schema, CartItem).await?;
    create_table_for(db, &schema, OrderItem).await?;

    let unique_line = Index::create()
        .name(CART_ITEM_UNIQUE_INDEX)
        .table(CartItem)
        .col(cart_item::Column::SessionId)
        .col(cart_item::Column::ProductId)
        .col(cart_item::Column::Size)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&unique_line)).await?;

    info!("Database tables ensured.");
    Ok(())
}
