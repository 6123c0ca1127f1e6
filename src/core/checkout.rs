//! Checkout business logic - turns the current cart into an order.
//!
//! The order, its items, and the clearing of the cart happen in one database transaction,
//! so a caller either sees a placed order with an empty cart or no change at all. Order
//! items copy the product's name and price so the order keeps its history when the
//! catalog changes.

use crate::{
    core::cart::{CartManager, cart_total, delete_session_items, load_cart},
    entities::{Order, OrderItem, order, order_item},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Contact and shipping details collected at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    /// Full name
    pub name: String,
    /// Email address
    pub email: String,
    /// Phone number
    pub phone: String,
    /// Free-form shipping address
    pub address: String,
}

impl CustomerDetails {
    fn validate(&self) -> Result<()> {
        let required = [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(Error::InvalidCustomer { field: *field });
        }
        if !self.email.contains('@') {
            return Err(Error::InvalidCustomer { field: "email" });
        }
        Ok(())
    }
}

/// Places an order for everything in `cart` and empties it.
///
/// Observers of the cart are notified once the order is committed.
///
/// # Errors
/// Returns an error if:
/// - A customer field is blank, or the email has no `@`
/// - The cart is empty
/// - Any database operation fails, in which case nothing is written
#[instrument(skip_all, fields(session_id = %cart.session_id()))]
pub async fn checkout(cart: &CartManager, customer: CustomerDetails) -> Result<order::Model> {
    customer.validate()?;

    let session_id = cart.session_id().to_string();
    let txn = cart.db().begin().await?;

    let entries = load_cart(&txn, &session_id).await?;
    if entries.is_empty() {
        return Err(Error::EmptyCart);
    }

    let order = order::ActiveModel {
        session_id: Set(session_id.clone()),
        customer_name: Set(customer.name.trim().to_string()),
        customer_email: Set(customer.email.trim().to_string()),
        customer_phone: Set(customer.phone.trim().to_string()),
        shipping_address: Set(customer.address.trim().to_string()),
        total_amount: Set(cart_total(&entries)),
        status: Set(order::STATUS_PENDING.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let items = entries.iter().map(|entry| order_item::ActiveModel {
        order_id: Set(order.id),
        product_id: Set(entry.item.product_id),
        product_name: Set(entry
            .product
            .as_ref()
            .map(|p| p.name.clone())
            .unwrap_or_default()),
        product_price: Set(entry.unit_price()),
        quantity: Set(entry.item.quantity),
        size: Set(entry.item.size.clone()),
        ..Default::default()
    });
    OrderItem::insert_many(items).exec(&txn).await?;

    delete_session_items(&txn, &session_id).await?;
    txn.commit().await?;

    info!(
        order_id = order.id,
        lines = entries.len(),
        total = order.total_amount,
        "Order placed"
    );
    cart.notify();
    Ok(order)
}

/// Retrieves an order together with its items.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_order<C>(
    db: &C,
    order_id: i64,
) -> Result<Option<(order::Model, Vec<order_item::Model>)>>
where
    C: ConnectionTrait,
{
    let Some(order) = Order::find_by_id(order_id).one(db).await? else {
        return Ok(None);
    };
    let items = order
        .find_related(OrderItem)
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await?;
    Ok(Some((order, items)))
}

/// Lists the orders placed by a session, newest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_orders_for_session<C>(db: &C, session_id: &str) -> Result<Vec<order::Model>>
where
    C: ConnectionTrait,
{
    Order::find()
        .filter(order::Column::SessionId.eq(session_id))
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_customer_validation() {
        assert!(test_customer().validate().is_ok());

        let mut blank_name = test_customer();
        blank_name.name = "  ".to_string();
        assert!(matches!(
            blank_name.validate(),
            Err(Error::InvalidCustomer { field: "name" })
        ));

        let mut bad_email = test_customer();
        bad_email.email = "not-an-email".to_string();
        assert!(matches!(
            bad_email.validate(),
            Err(Error::InvalidCustomer { field: "email" })
        ));

        let mut no_address = test_customer();
        no_address.address = String::new();
        assert!(matches!(
            no_address.validate(),
            Err(Error::InvalidCustomer { field: "address" })
        ));
    }

    #[tokio::test]
    async fn test_cart_walkthrough_to_order() -> Result<()> {
        let (db, cart) = setup_cart("walkthrough").await?;
        let p1 = create_test_product(&db, "P1").await?;

        cart.add_to_cart(p1.id, "M", 2).await?;
        let entries = cart.get_cart().await?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].item.quantity, 2);

        let medium = cart.add_to_cart(p1.id, "M", 1).await?;
        let entries = cart.get_cart().await?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].item.quantity, 3);

        cart.add_to_cart(p1.id, "L", 1).await?;
        assert_eq!(cart.get_cart().await?.len(), 2);

        cart.remove_from_cart(medium.id).await?;
        let entries = cart.get_cart().await?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].item.size, "L");
        assert_eq!(entries[0].item.quantity, 1);

        let order = checkout(&cart, test_customer()).await?;
        assert_eq!(order.status, "pending");
        assert_eq!(order.total_amount, 10.0);
        assert_eq!(order.session_id, "walkthrough");

        let (stored, items) = get_order(&db, order.id).await?.unwrap();
        assert_eq!(stored.id, order.id);
        assert_eq!(stored.customer_email, "ana@example.com");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, p1.id);
        assert_eq!(items[0].product_name, "P1");
        assert_eq!(items[0].product_price, 10.0);
        assert_eq!(items[0].size, "L");
        assert_eq!(items[0].quantity, 1);

        assert!(cart.get_cart().await?.is_empty());
        assert_eq!(cart.get_cart_count().await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_totals_multiple_lines() -> Result<()> {
        let (db, cart) = setup_cart("multi").await?;
        let tee = create_test_product(&db, "Tee").await?;
        let hat = create_custom_product(&db, "Hat", 25.5, &["Unitalla"]).await?;
        cart.add_to_cart(tee.id, "S", 3).await?;
        cart.add_to_cart(hat.id, "Unitalla", 2).await?;

        let order = checkout(&cart, test_customer()).await?;
        assert_eq!(order.total_amount, 81.0);

        let (_, items) = get_order(&db, order.id).await?.unwrap();
        assert_eq!(items.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_empty_cart() -> Result<()> {
        let (db, cart) = setup_cart("empty").await?;
        let calls = count_notifications(&cart);

        let result = checkout(&cart, test_customer()).await;
        assert!(matches!(result.unwrap_err(), Error::EmptyCart));
        assert!(list_orders_for_session(&db, "empty").await?.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_invalid_customer_keeps_cart() -> Result<()> {
        let (db, cart) = setup_cart("invalid").await?;
        let tee = create_test_product(&db, "Tee").await?;
        cart.add_to_cart(tee.id, "M", 1).await?;

        let mut customer = test_customer();
        customer.phone = " ".to_string();
        let result = checkout(&cart, customer).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidCustomer { field: "phone" }
        ));
        assert_eq!(cart.get_cart_count().await?, 1);
        assert!(list_orders_for_session(&db, "invalid").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_notifies_once() -> Result<()> {
        let (db, cart) = setup_cart("notify").await?;
        let tee = create_test_product(&db, "Tee").await?;
        cart.add_to_cart(tee.id, "M", 1).await?;
        let calls = count_notifications(&cart);

        checkout(&cart, test_customer()).await?;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_checkout_rolls_back() -> Result<()> {
        let (db, cart) = setup_cart("rollback").await?;
        let tee = create_test_product(&db, "Tee").await?;
        cart.add_to_cart(tee.id, "M", 2).await?;
        cart.add_to_cart(tee.id, "L", 1).await?;
        let calls = count_notifications(&cart);

        // Fail the second write of the transaction, after the order row is in
        db.execute_unprepared(
            "CREATE TRIGGER reject_order_items BEFORE INSERT ON order_items \
             BEGIN SELECT RAISE(ABORT, 'order items unavailable'); END;",
        )
        .await?;

        let result = checkout(&cart, test_customer()).await;
        assert!(matches!(result.unwrap_err(), Error::Database(_)));

        assert!(list_orders_for_session(&db, "rollback").await?.is_empty());
        assert_eq!(Order::find().count(&db).await?, 0);
        assert_eq!(cart.get_cart().await?.len(), 2);
        assert_eq!(cart.get_cart_count().await?, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_leaves_other_sessions_alone() -> Result<()> {
        let (db, cart_a) = setup_cart("a").await?;
        let cart_b = CartManager::new(db.clone(), test_session("b"));
        let tee = create_test_product(&db, "Tee").await?;
        cart_a.add_to_cart(tee.id, "M", 1).await?;
        cart_b.add_to_cart(tee.id, "M", 4).await?;

        checkout(&cart_a, test_customer()).await?;

        assert_eq!(cart_a.get_cart_count().await?, 0);
        assert_eq!(cart_b.get_cart_count().await?, 4);
        assert_eq!(list_orders_for_session(&db, "a").await?.len(), 1);
        assert!(list_orders_for_session(&db, "b").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() -> Result<()> {
        let (db, cart) = setup_cart("repeat").await?;
        let tee = create_test_product(&db, "Tee").await?;

        cart.add_to_cart(tee.id, "M", 1).await?;
        let first = checkout(&cart, test_customer()).await?;
        cart.add_to_cart(tee.id, "L", 2).await?;
        let second = checkout(&cart, test_customer()).await?;

        let orders = list_orders_for_session(&db, "repeat").await?;
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, second.id);
        assert_eq!(orders[1].id, first.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_order_missing() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(get_order(&db, 77).await?.is_none());
        Ok(())
    }
}
