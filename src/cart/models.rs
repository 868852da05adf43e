//! Shopping Cart Domain Models
//!
//! This module contains all data structures related to the cart page:
//! money, line items, seed input and the checkout snapshot.

use serde::{Deserialize, Serialize};
use std::{fmt, iter::Sum, ops::Add};

use crate::error::SeedError;

// =============================================================================
// Money
// =============================================================================

/// Non-negative amount of money held in whole cents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "RawMoney", into = "f64")]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Converts a decimal amount (e.g. `10.5`) rounding half-up to the cent.
    pub fn from_dollars(amount: f64) -> Result<Self, SeedError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(SeedError::InvalidPrice(amount.to_string()));
        }
        Ok(Self((amount * 100.0).round() as u64))
    }

    /// Parses `"5.99"` or `"$5.99"`.
    pub fn parse(raw: &str) -> Result<Self, SeedError> {
        let trimmed = raw.trim();
        let digits = trimmed.strip_prefix('$').unwrap_or(trimmed);
        let amount: f64 = digits
            .parse()
            .map_err(|_| SeedError::InvalidPrice(raw.to_string()))?;
        Self::from_dollars(amount)
    }

    /// Price of `quantity` units
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(u64::from(quantity)))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

/// Prices arrive as JSON numbers or as decimal strings such as `"5.99"`
#[derive(Deserialize)]
#[serde(untagged)]
enum RawMoney {
    Number(f64),
    Text(String),
}

impl TryFrom<RawMoney> for Money {
    type Error = SeedError;

    fn try_from(raw: RawMoney) -> Result<Self, Self::Error> {
        match raw {
            RawMoney::Number(amount) => Self::from_dollars(amount),
            RawMoney::Text(text) => Self::parse(&text),
        }
    }
}

impl From<Money> for f64 {
    fn from(money: Money) -> f64 {
        money.0 as f64 / 100.0
    }
}

/// Fixed tax rate stored in basis points (800 = 8%)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxRate(u32);

impl TaxRate {
    pub const fn from_basis_points(bps: u32) -> Self {
        Self(bps)
    }

    /// Builds a rate from a fraction such as `0.08`; `None` outside `0..=1`.
    pub fn from_fraction(rate: f64) -> Option<Self> {
        (rate.is_finite() && (0.0..=1.0).contains(&rate))
            .then(|| Self((rate * 10_000.0).round() as u32))
    }

    pub const fn basis_points(self) -> u32 {
        self.0
    }

    /// Tax owed on `amount`, rounded half-up to the cent.
    pub fn apply(self, amount: Money) -> Money {
        let cents = u128::from(amount.cents()) * u128::from(self.0);
        Money::from_cents(((cents + 5_000) / 10_000) as u64)
    }

    /// Human-readable percentage, e.g. `8%` or `8.25%`.
    pub fn percent_label(self) -> String {
        format!("{}%", f64::from(self.0) / 100.0)
    }
}

impl Serialize for TaxRate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(f64::from(self.0) / 10_000.0)
    }
}

/// Shipping and tax applied at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pricing {
    pub shipping: Money,
    pub tax_rate: TaxRate,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            shipping: Money::from_cents(599),
            tax_rate: TaxRate::from_basis_points(800),
        }
    }
}

// =============================================================================
// Line Items
// =============================================================================

/// Opaque line-item identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawItemId", into = "String")]
pub struct ItemId(String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> String {
        id.0
    }
}

/// Seed data may carry ids as strings or plain numbers
#[derive(Deserialize)]
#[serde(untagged)]
enum RawItemId {
    Text(String),
    Number(u64),
}

impl From<RawItemId> for ItemId {
    fn from(raw: RawItemId) -> Self {
        match raw {
            RawItemId::Text(id) => Self(id),
            RawItemId::Number(id) => Self(id.to_string()),
        }
    }
}

/// Lifecycle of a line item inside the cart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Active,
    /// Removal transition is running; the item ignores further actions
    PendingRemoval,
}

/// One product entry in the cart
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub(crate) id: ItemId,
    pub(crate) name: String,
    pub(crate) unit_price: Money,
    pub(crate) quantity: u32,
    pub(crate) status: ItemStatus,
}

impl LineItem {
    /// Creates an active line item. Quantity must be at least 1.
    pub fn new(
        id: impl Into<ItemId>,
        name: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> Result<Self, SeedError> {
        let id = id.into();
        if quantity == 0 {
            return Err(SeedError::ZeroQuantity(id));
        }
        Ok(Self {
            id,
            name: name.into(),
            unit_price,
            quantity,
            status: ItemStatus::Active,
        })
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// Returns the default quantity (1) for seed items
fn default_quantity() -> u32 {
    1
}

/// Initial line-item data supplied by the host page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeedItem {
    pub id: ItemId,
    pub name: String,
    pub price: Money,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl TryFrom<SeedItem> for LineItem {
    type Error = SeedError;

    fn try_from(seed: SeedItem) -> Result<Self, Self::Error> {
        LineItem::new(seed.id, seed.name, seed.price, seed.quantity)
    }
}

/// Short-lived animation on a row's quantity display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RowEffect {
    /// Quantity changed
    Pulse,
    /// Decrement refused at the minimum
    Shake,
}

/// Whether the cart renders rows or the empty placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CartDisplay {
    HasItems,
    Empty,
}

// =============================================================================
// Checkout Snapshot
// =============================================================================

/// One itemized line of an order summary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryLine {
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub line_total: Money,
}

/// Immutable snapshot of the cart taken when checkout starts
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub lines: Vec<SummaryLine>,
    pub subtotal: Money,
    pub shipping: Money,
    pub tax_rate: TaxRate,
    pub tax: Money,
    pub total: Money,
}

impl OrderSummary {
    /// Builds the snapshot, computing tax and total exactly once.
    pub fn new(lines: Vec<SummaryLine>, pricing: Pricing) -> Self {
        let subtotal: Money = lines.iter().map(|l| l.line_total).sum();
        let tax = pricing.tax_rate.apply(subtotal);
        Self {
            lines,
            subtotal,
            shipping: pricing.shipping,
            tax_rate: pricing.tax_rate,
            tax,
            total: subtotal + pricing.shipping + tax,
        }
    }
}

/// Result of confirming an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_id: String,
    pub total: Money,
}
