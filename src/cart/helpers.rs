//! Shopping Cart Helpers
//!
//! Small pure functions for cart labels, feedback text and order ids.

use super::models::{LineItem, SummaryLine};
use uuid::Uuid;

/// Length of the generated order number
pub const ORDER_ID_LEN: usize = 8;

/// Produces a new opaque order number such as `"3F9A01CE"`.
pub fn generate_order_id() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(ORDER_ID_LEN)
        .collect::<String>()
        .to_uppercase()
}

/// Label for the header item count: `"1 item"`, `"3 items"`.
pub fn format_item_count(count: u32) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} item{suffix}")
}

/// Produces a human-readable one-line summary for a list of summary lines.
///
/// Example output: `"2x Apple, 1x Banana"`.
pub fn format_item_summary(lines: &[SummaryLine]) -> String {
    lines
        .iter()
        .map(|l| format!("{}x {}", l.quantity, l.name))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn quantity_updated_text(item: &LineItem) -> String {
    format!("{}: quantity updated to {}", item.name(), item.quantity())
}

pub fn removed_text(item: &LineItem) -> String {
    format!("{} removed from cart", item.name())
}

pub const MINIMUM_QUANTITY_TEXT: &str = "Minimum quantity is 1. Click ✕ to remove.";
pub const EMPTY_CART_TEXT: &str = "Your cart is empty!";
pub const GOING_BACK_TEXT: &str = "Going back to shop...";
