//! Unified error type for the storefront.
//!
//! Store failures are carried unchanged in [`Error::Database`]; the remaining
//! variants describe input the cart, catalog, or checkout refused before any
//! write reached the store.

use thiserror::Error;

/// Every failure the crate can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The backing store rejected or failed a request.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// No product exists with the given id.
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// Requested product id
        id: i64,
    },

    /// No cart item with the given id exists in the current session.
    #[error("Cart item not found: {id}")]
    CartItemNotFound {
        /// Requested cart item id
        id: i64,
    },

    /// The requested size is not one the product is offered in.
    #[error("Size '{size}' is not available for product {product_id}")]
    InvalidSize {
        /// Product the size was requested for
        product_id: i64,
        /// Rejected size
        size: String,
    },

    /// Quantity must be a positive integer.
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// Rejected quantity
        quantity: i32,
    },

    /// Prices must be positive and finite.
    #[error("Invalid price: {price}")]
    InvalidPrice {
        /// Rejected price
        price: f64,
    },

    /// A product definition failed validation.
    #[error("Invalid product: {message}")]
    InvalidProduct {
        /// What was wrong with it
        message: String,
    },

    /// A checkout form field is missing or malformed.
    #[error("Invalid customer details: {field}")]
    InvalidCustomer {
        /// Name of the offending field
        field: &'static str,
    },

    /// Checkout was attempted with nothing in the cart.
    #[error("Cannot check out an empty cart")]
    EmptyCart,

    /// Filesystem failure (session file, config file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
