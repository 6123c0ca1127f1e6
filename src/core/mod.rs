//! Core business logic - framework-agnostic catalog, cart, and checkout operations.

/// Session-scoped cart manager with change notification
pub mod cart;
/// Product catalog reads, creation, and seeding
pub mod catalog;
/// Turning a cart into an order
pub mod checkout;
/// Observer registry used by the cart manager
pub mod observers;
/// Session identity
pub mod session;
