//! Shopping Cart State
//!
//! `CartState` is the system of record for the cart page. Every mutating
//! method settles the derived totals before returning, so callers never
//! observe a subtotal or item count that disagrees with the items.

use std::collections::HashSet;

use super::models::{
    CartDisplay, ItemId, ItemStatus, LineItem, Money, OrderSummary, Pricing, SeedItem,
    SummaryLine,
};
use crate::error::{CartError, SeedError};

/// Derived values kept in step with the item collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Totals {
    subtotal: Money,
    item_count: u32,
}

/// Ordered collection of line items plus their derived totals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    items: Vec<LineItem>,
    totals: Totals,
}

impl CartState {
    /// Builds a settled cart. Item ids must be unique.
    pub fn from_items(items: Vec<LineItem>) -> Result<Self, SeedError> {
        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.id.clone()) {
                return Err(SeedError::DuplicateItem(item.id.clone()));
            }
        }

        let mut state = Self {
            items,
            totals: Totals::default(),
        };
        state.settle();
        Ok(state)
    }

    /// Builds a cart from seed data supplied by the host page.
    pub fn from_seed(seed: &[SeedItem]) -> Result<Self, SeedError> {
        let items = seed
            .iter()
            .cloned()
            .map(LineItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_items(items)
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, id: &ItemId) -> Option<&LineItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Sum of every line total, including items still fading out
    pub fn subtotal(&self) -> Money {
        self.totals.subtotal
    }

    /// Sum of every quantity, including items still fading out
    pub fn item_count(&self) -> u32 {
        self.totals.item_count
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn display(&self) -> CartDisplay {
        if self.items.is_empty() {
            CartDisplay::Empty
        } else {
            CartDisplay::HasItems
        }
    }

    /// Adds one unit. No upper bound.
    pub fn increase(&mut self, id: &ItemId) -> Result<&LineItem, CartError> {
        let index = self.active_index(id)?;
        let item = &mut self.items[index];
        item.quantity = item.quantity.saturating_add(1);
        self.settle();
        Ok(&self.items[index])
    }

    /// Removes one unit. Quantity never drops below 1 through this path.
    pub fn decrease(&mut self, id: &ItemId) -> Result<&LineItem, CartError> {
        let index = self.active_index(id)?;
        let item = &mut self.items[index];
        if item.quantity <= 1 {
            return Err(CartError::MinimumQuantity(id.clone()));
        }
        item.quantity -= 1;
        self.settle();
        Ok(&self.items[index])
    }

    /// Starts the removal transition. The item stays counted until
    /// [`complete_removal`](Self::complete_removal) runs.
    pub fn mark_for_removal(&mut self, id: &ItemId) -> Result<&LineItem, CartError> {
        let index = self.active_index(id)?;
        self.items[index].status = ItemStatus::PendingRemoval;
        Ok(&self.items[index])
    }

    /// Drops the item and settles totals.
    pub fn complete_removal(&mut self, id: &ItemId) -> Result<LineItem, CartError> {
        let index = self
            .items
            .iter()
            .position(|i| &i.id == id)
            .ok_or_else(|| CartError::ItemNotFound(id.clone()))?;
        let removed = self.items.remove(index);
        self.settle();
        Ok(removed)
    }

    /// Snapshot of the cart with shipping and tax applied.
    ///
    /// Items still running their removal transition are listed, matching the
    /// subtotal on screen.
    pub fn order_summary(&self, pricing: Pricing) -> Result<OrderSummary, CartError> {
        let lines: Vec<SummaryLine> = self
            .items
            .iter()
            .map(|i| SummaryLine {
                name: i.name.clone(),
                unit_price: i.unit_price,
                quantity: i.quantity,
                line_total: i.line_total(),
            })
            .collect();

        if lines.is_empty() {
            return Err(CartError::EmptyCart);
        }

        Ok(OrderSummary::new(lines, pricing))
    }

    fn active_index(&self, id: &ItemId) -> Result<usize, CartError> {
        let index = self
            .items
            .iter()
            .position(|i| &i.id == id)
            .ok_or_else(|| CartError::ItemNotFound(id.clone()))?;
        match self.items[index].status {
            ItemStatus::Active => Ok(index),
            ItemStatus::PendingRemoval => Err(CartError::RemovalPending(id.clone())),
        }
    }

    fn settle(&mut self) {
        self.totals = Totals {
            subtotal: self.items.iter().map(LineItem::line_total).sum(),
            item_count: self.items.iter().map(|i| i.quantity).sum(),
        };
    }
}
