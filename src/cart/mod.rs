//! Shopping Cart Domain Module
//!
//! This module contains all cart page business logic, including:
//! - Domain models (Money, LineItem, OrderSummary)
//! - Cart state with derived totals
//! - The line-item controller that reacts to page events
//! - Formatting helpers

pub mod controller;
pub mod helpers;
pub mod models;
pub mod state;

// Re-export commonly used types for convenience
pub use controller::{ActionOutcome, CartController};
pub use state::CartState;
