//! Shared test utilities for the storefront.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        cart::CartManager,
        catalog::{self, NewProduct},
        checkout::CustomerDetails,
        session::{Session, SessionProvider},
    },
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output to the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A session provider with a fixed id.
pub fn test_session(id: &str) -> Arc<dyn SessionProvider> {
    Arc::new(Session::from_id(id))
}

/// Sets up a database and a cart manager for session `session_id`.
pub async fn setup_cart(session_id: &str) -> Result<(DatabaseConnection, CartManager)> {
    let db = setup_test_db().await?;
    let cart = CartManager::new(db.clone(), test_session(session_id));
    Ok((db, cart))
}

/// Product fields with sensible defaults.
///
/// # Defaults
/// * `price`: 10.0
/// * `category`: "tops"
/// * `sizes`: S, M, L
/// * `stock`: 10
pub fn new_product(name: &str) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: format!("{name} description"),
        price: 10.0,
        image_url: format!("https://img.example.com/{name}.jpg"),
        category: "tops".to_string(),
        sizes: vec!["S".to_string(), "M".to_string(), "L".to_string()],
        stock: 10,
        featured: false,
    }
}

/// Creates a test product with the defaults of [`new_product`].
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::product::Model> {
    catalog::create_product(db, new_product(name)).await
}

/// Creates a test product with a custom price and sizes.
pub async fn create_custom_product(
    db: &DatabaseConnection,
    name: &str,
    price: f64,
    sizes: &[&str],
) -> Result<entities::product::Model> {
    let mut product = new_product(name);
    product.price = price;
    product.sizes = sizes.iter().map(ToString::to_string).collect();
    catalog::create_product(db, product).await
}

/// Checkout details that pass validation.
pub fn test_customer() -> CustomerDetails {
    CustomerDetails {
        name: "Ana López".to_string(),
        email: "ana@example.com".to_string(),
        phone: "555-123-4567".to_string(),
        address: "Calle 1, Col. Centro, CDMX 06000".to_string(),
    }
}

/// Subscribes a counter to `cart` and returns it. The subscription stays registered.
pub fn count_notifications(cart: &CartManager) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let handle = Arc::clone(&count);
    let _subscription = cart.subscribe(move || {
        handle.fetch_add(1, Ordering::SeqCst);
    });
    count
}
