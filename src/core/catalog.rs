//! Catalog business logic - Handles all product-related operations.
//!
//! The cart only ever reads products; this module is where they are created,
//! listed for browsing, and seeded from configuration. Listing puts featured
//! products first and can be narrowed to a single category.

use crate::{
    config::catalog::Config,
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, info, instrument};

/// Fields needed to create a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    /// Display name
    pub name: String,
    /// Longer description
    pub description: String,
    /// Unit price, must be positive and finite
    pub price: f64,
    /// Image reference
    pub image_url: String,
    /// Category
    pub category: String,
    /// Sizes, at least one
    pub sizes: Vec<String>,
    /// Units in stock, not negative
    pub stock: i32,
    /// Listed first when set
    pub featured: bool,
}

impl From<&crate::config::catalog::ProductConfig> for NewProduct {
    fn from(config: &crate::config::catalog::ProductConfig) -> Self {
        Self {
            name: config.name.clone(),
            description: config.description.clone(),
            price: config.price,
            image_url: config.image_url.clone(),
            category: config.category.clone(),
            sizes: config.sizes.clone(),
            stock: config.stock,
            featured: config.featured,
        }
    }
}

/// Lists products, featured first then alphabetically, optionally limited to one category.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_products<C>(db: &C, category: Option<&str>) -> Result<Vec<product::Model>>
where
    C: ConnectionTrait,
{
    let mut query = Product::find();
    if let Some(category) = category {
        query = query.filter(product::Column::Category.eq(category));
    }
    query
        .order_by_desc(product::Column::Featured)
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a product by its unique ID.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

async fn get_product_by_name<C>(db: &C, name: &str) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find()
        .filter(product::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

fn validate(new: &NewProduct) -> Result<()> {
    if new.name.trim().is_empty() {
        return Err(Error::InvalidProduct {
            message: "Product name cannot be empty".to_string(),
        });
    }

    if !new.price.is_finite() || new.price <= 0.0 {
        return Err(Error::InvalidPrice { price: new.price });
    }

    if new.sizes.is_empty() {
        return Err(Error::InvalidProduct {
            message: format!("Product '{}' needs at least one size", new.name.trim()),
        });
    }

    if new.sizes.iter().any(|s| s.trim().is_empty()) {
        return Err(Error::InvalidProduct {
            message: format!("Product '{}' has a blank size", new.name.trim()),
        });
    }

    if new.stock < 0 {
        return Err(Error::InvalidProduct {
            message: format!("Product '{}' has negative stock", new.name.trim()),
        });
    }

    Ok(())
}

/// Creates a new product after validating it.
///
/// # Errors
/// Returns an error if:
/// - The name is empty or whitespace-only
/// - The price is not positive or not finite (NaN, infinity)
/// - There are no sizes, or one of them is blank
/// - The stock is negative
/// - The database insert operation fails
#[instrument(skip(db, new), fields(name = %new.name))]
pub async fn create_product<C>(db: &C, new: NewProduct) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    validate(&new)?;

    let product = product::ActiveModel {
        name: Set(new.name.trim().to_string()),
        description: Set(new.description),
        price: Set(new.price),
        image_url: Set(new.image_url),
        category: Set(new.category),
        sizes: Set(new.sizes.into()),
        stock: Set(new.stock),
        featured: Set(new.featured),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let product = product.insert(db).await?;
    debug!(product_id = product.id, "Created product");
    Ok(product)
}

/// Inserts every configured product whose name is not in the catalog yet.
///
/// Returns how many products were inserted.
///
/// # Errors
/// Returns an error if a configured product is invalid or a database operation fails.
/// Products inserted before the failure stay inserted.
#[instrument(skip_all)]
pub async fn seed_catalog<C>(db: &C, config: &Config) -> Result<usize>
where
    C: ConnectionTrait,
{
    let mut inserted = 0;
    for entry in &config.products {
        if get_product_by_name(db, entry.name.trim()).await?.is_some() {
            debug!(name = %entry.name, "Product already seeded");
            continue;
        }
        create_product(db, NewProduct::from(entry)).await?;
        inserted += 1;
    }
    info!(
        inserted,
        configured = config.products.len(),
        "Catalog seeding complete"
    );
    Ok(inserted)
}
