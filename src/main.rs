use dotenvy::dotenv;
use std::sync::Arc;
use storefront::config::{catalog as catalog_config, database, settings};
use storefront::core::{catalog, checkout};
use storefront::{CartManager, Result, Session};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    // 3. Load the catalog seed configuration
    let config = catalog_config::load_config(settings::catalog_config())
        .inspect_err(|e| error!("Failed to load catalog configuration: {}", e))?;

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed the catalog
    catalog::seed_catalog(&db, &config)
        .await
        .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;

    // 6. Resume the shopper's session and report the state of the store
    let session = Session::load_or_create(settings::session_file())?;
    let cart = CartManager::new(db, Arc::new(session));

    for product in catalog::list_products(cart.db(), None).await? {
        info!(
            id = product.id,
            category = %product.category,
            price = product.price,
            featured = product.featured,
            sizes = ?product.sizes.0,
            "{}",
            product.name
        );
    }

    let entries = cart.get_cart().await?;
    info!(
        session_id = cart.session_id(),
        lines = entries.len(),
        items = storefront::core::cart::cart_count(&entries),
        total = storefront::core::cart::cart_total(&entries),
        "Cart summary"
    );

    let orders = checkout::list_orders_for_session(cart.db(), cart.session_id()).await?;
    info!(orders = orders.len(), "Orders placed by this session");

    Ok(())
}
