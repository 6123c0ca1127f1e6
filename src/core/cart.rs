//! Cart business logic - the single point of mutation and observation for one session's cart.
//!
//! Every read and write is scoped to the session id the manager was built with. Adding a
//! (product, size) that is already in the cart increments the stored quantity instead of
//! creating a second line; the merge is one store-side upsert against the unique
//! (`session_id`, `product_id`, `size`) index, so concurrent adds cannot lose updates or
//! duplicate rows. After every successful mutation all subscribed observers are notified.
//! Store errors are returned unchanged and never trigger a notification.

use crate::{
    core::{
        catalog,
        observers::{CartObservers, Subscription},
        session::SessionProvider,
    },
    entities::{CartItem, Product, cart_item, product},
    errors::{Error, Result},
};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// A cart line joined with the product it refers to.
///
/// `product` is `None` when the referenced product row could not be loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartEntry {
    /// The stored cart line
    pub item: cart_item::Model,
    /// Snapshot of the referenced product, if found
    pub product: Option<product::Model>,
}

impl CartEntry {
    /// Unit price of the attached product, 0 when there is none.
    #[must_use]
    pub fn unit_price(&self) -> f64 {
        self.product.as_ref().map_or(0.0, |p| p.price)
    }

    /// Price × quantity for this line.
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.unit_price() * f64::from(self.item.quantity)
    }
}

/// Sum of price × quantity over `entries`. Lines without a product contribute 0.
#[must_use]
pub fn cart_total(entries: &[CartEntry]) -> f64 {
    entries.iter().map(CartEntry::line_total).sum()
}

/// Sum of quantities over `entries`.
#[must_use]
pub fn cart_count(entries: &[CartEntry]) -> i64 {
    entries.iter().map(|e| i64::from(e.item.quantity)).sum()
}

/// Loads the cart lines of `session_id`, oldest first, each with its product.
pub(crate) async fn load_cart<C>(db: &C, session_id: &str) -> Result<Vec<CartEntry>>
where
    C: ConnectionTrait,
{
    let rows = CartItem::find()
        .find_also_related(Product)
        .filter(cart_item::Column::SessionId.eq(session_id))
        .order_by_asc(cart_item::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(item, product)| CartEntry { item, product })
        .collect())
}

/// Deletes every cart line of `session_id`, returning how many were removed.
pub(crate) async fn delete_session_items<C>(db: &C, session_id: &str) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = CartItem::delete_many()
        .filter(cart_item::Column::SessionId.eq(session_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Cart manager for one session.
///
/// Construct one per application instance and hand it to whatever needs the cart;
/// observers subscribe on it directly.
pub struct CartManager {
    db: DatabaseConnection,
    session: Arc<dyn SessionProvider>,
    observers: CartObservers,
}

impl fmt::Debug for CartManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartManager")
            .field("session_id", &self.session_id())
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

impl CartManager {
    /// Creates a manager for the session reported by `session`.
    #[must_use]
    pub fn new(db: DatabaseConnection, session: Arc<dyn SessionProvider>) -> Self {
        Self {
            db,
            session,
            observers: CartObservers::new(),
        }
    }

    /// The session every cart row is scoped to.
    #[must_use]
    pub fn session_id(&self) -> &str {
        self.session.session_id()
    }

    /// The underlying store connection.
    #[must_use]
    pub const fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// The observer registry.
    #[must_use]
    pub const fn observers(&self) -> &CartObservers {
        &self.observers
    }

    /// Registers a callback run after every successful cart mutation.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.observers.subscribe(callback)
    }

    pub(crate) fn notify(&self) {
        self.observers.notify();
    }

    /// Returns the session's cart lines, oldest first, each joined with its product.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    #[instrument(skip(self), fields(session_id = %self.session_id()))]
    pub async fn get_cart(&self) -> Result<Vec<CartEntry>> {
        let entries = load_cart(&self.db, self.session_id()).await?;
        debug!(lines = entries.len(), "Loaded cart");
        Ok(entries)
    }

    /// Adds `quantity` units of `product_id` in `size`, merging into an existing line.
    ///
    /// If the session already holds this (product, size) its quantity becomes
    /// existing + `quantity`; otherwise a new line is created. Returns the stored line.
    ///
    /// # Errors
    /// Returns an error if:
    /// - `quantity` is not positive, or merging it would overflow the stored quantity
    /// - The product does not exist
    /// - `size` is not one of the product's sizes
    /// - A database operation fails
    #[instrument(skip(self), fields(session_id = %self.session_id()))]
    pub async fn add_to_cart(
        &self,
        product_id: i64,
        size: &str,
        quantity: i32,
    ) -> Result<cart_item::Model> {
        if quantity <= 0 {
            return Err(Error::InvalidQuantity { quantity });
        }

        let product = catalog::get_product_by_id(&self.db, product_id)
            .await?
            .ok_or(Error::ProductNotFound { id: product_id })?;
        if !product.sizes.contains(size) {
            return Err(Error::InvalidSize {
                product_id,
                size: size.to_string(),
            });
        }

        let line = cart_item::ActiveModel {
            session_id: Set(self.session_id().to_string()),
            product_id: Set(product_id),
            quantity: Set(quantity),
            size: Set(size.to_string()),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };
        let merge = OnConflict::columns([
            cart_item::Column::SessionId,
            cart_item::Column::ProductId,
            cart_item::Column::Size,
        ])
        .value(
            cart_item::Column::Quantity,
            Expr::col((CartItem, cart_item::Column::Quantity)).add(quantity),
        )
        .action_and_where(
            Expr::col((CartItem, cart_item::Column::Quantity)).lte(i32::MAX - quantity),
        )
        .to_owned();
        // Zero rows means the existing line is too large to take `quantity` more
        match CartItem::insert(line)
            .on_conflict(merge)
            .exec_without_returning(&self.db)
            .await
        {
            Ok(0) | Err(DbErr::RecordNotInserted) => {
                return Err(Error::InvalidQuantity { quantity });
            }
            Ok(_) => {}
            Err(e) => return Err(e.into()),
        }

        let stored = CartItem::find()
            .filter(cart_item::Column::SessionId.eq(self.session_id()))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .filter(cart_item::Column::Size.eq(size))
            .one(&self.db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("cart item after upsert".to_string()))?;

        info!(
            item_id = stored.id,
            quantity = stored.quantity,
            "Added to cart"
        );
        self.notify();
        Ok(stored)
    }

    /// Adds a single unit, the default quantity for an add.
    ///
    /// # Errors
    /// Same as [`CartManager::add_to_cart`].
    pub async fn add_one(&self, product_id: i64, size: &str) -> Result<cart_item::Model> {
        self.add_to_cart(product_id, size, 1).await
    }

    /// Overwrites the quantity of a line. A quantity of zero or less removes the line.
    ///
    /// # Errors
    /// Returns `Error::CartItemNotFound` if the session has no line with `item_id`
    /// (only for positive quantities), or an error if a database operation fails.
    #[instrument(skip(self), fields(session_id = %self.session_id()))]
    pub async fn update_quantity(&self, item_id: i64, quantity: i32) -> Result<()> {
        if quantity <= 0 {
            return self.remove_from_cart(item_id).await;
        }

        let result = CartItem::update_many()
            .col_expr(cart_item::Column::Quantity, Expr::value(quantity))
            .filter(cart_item::Column::Id.eq(item_id))
            .filter(cart_item::Column::SessionId.eq(self.session_id()))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(Error::CartItemNotFound { id: item_id });
        }

        debug!("Updated cart line quantity");
        self.notify();
        Ok(())
    }

    /// Deletes a line. Deleting a line that is not there succeeds.
    ///
    /// # Errors
    /// Returns an error if the database delete fails.
    #[instrument(skip(self), fields(session_id = %self.session_id()))]
    pub async fn remove_from_cart(&self, item_id: i64) -> Result<()> {
        let result = CartItem::delete_many()
            .filter(cart_item::Column::Id.eq(item_id))
            .filter(cart_item::Column::SessionId.eq(self.session_id()))
            .exec(&self.db)
            .await?;

        debug!(removed = result.rows_affected, "Removed cart line");
        self.notify();
        Ok(())
    }

    /// Deletes every line of the session, returning how many were removed.
    ///
    /// # Errors
    /// Returns an error if the database delete fails.
    #[instrument(skip(self), fields(session_id = %self.session_id()))]
    pub async fn clear_cart(&self) -> Result<u64> {
        let removed = delete_session_items(&self.db, self.session_id()).await?;
        info!(removed, "Cleared cart");
        self.notify();
        Ok(removed)
    }

    /// Sum of price × quantity over the cart; lines without a product count as 0.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn get_cart_total(&self) -> Result<f64> {
        Ok(cart_total(&self.get_cart().await?))
    }

    /// Total number of units in the cart.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn get_cart_count(&self) -> Result<i64> {
        Ok(cart_count(&self.get_cart().await?))
    }
}
