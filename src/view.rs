//! Cart View Projection
//!
//! A pure, one-directional rendering of controller state. Renderers draw a
//! [`CartView`] and never read values back from it.

use serde::Serialize;

use crate::cart::{
    helpers::format_item_count,
    models::{CartDisplay, ItemId, ItemStatus, OrderConfirmation, OrderSummary, RowEffect},
    state::CartState,
};
use crate::checkout::CheckoutModal;
use crate::toast::{Severity, Toast, ToastId, ToastPhase};

// =============================================================================
// View Models
// =============================================================================

/// Everything the page needs to draw itself
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub display: CartDisplay,
    pub rows: Vec<RowView>,
    pub subtotal: String,
    pub item_count: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_state: Option<EmptyStateView>,
    pub toasts: Vec<ToastView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modal: Option<ModalView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowView {
    pub id: ItemId,
    pub name: String,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
    /// Row is running its fade-out
    pub removing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<RowEffect>,
}

/// Placeholder shown once the last item is gone
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyStateView {
    pub title: &'static str,
    pub message: &'static str,
    pub action: &'static str,
}

impl Default for EmptyStateView {
    fn default() -> Self {
        Self {
            title: "Your cart is empty",
            message: "Looks like you haven't added any items yet!",
            action: "Refresh Page",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToastView {
    pub id: ToastId,
    pub text: String,
    pub severity: Severity,
    pub icon: &'static str,
    pub color: &'static str,
    pub phase: ToastPhase,
}

impl From<&Toast> for ToastView {
    fn from(toast: &Toast) -> Self {
        Self {
            id: toast.id,
            text: toast.text.clone(),
            severity: toast.severity,
            icon: toast.severity.icon(),
            color: toast.severity.color(),
            phase: toast.phase,
        }
    }
}

/// One `label .... amount` line of the modal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModalLine {
    pub label: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum ModalView {
    #[serde(rename_all = "camelCase")]
    Review {
        title: &'static str,
        lines: Vec<ModalLine>,
        subtotal: String,
        shipping: String,
        tax_label: String,
        tax: String,
        total: String,
    },
    #[serde(rename_all = "camelCase")]
    Confirmed {
        title: &'static str,
        order_number: String,
        total: String,
    },
}

impl From<&OrderSummary> for ModalView {
    fn from(summary: &OrderSummary) -> Self {
        ModalView::Review {
            title: "Order Summary",
            lines: summary
                .lines
                .iter()
                .map(|l| ModalLine {
                    label: format!("{} x{}", l.name, l.quantity),
                    amount: l.line_total.to_string(),
                })
                .collect(),
            subtotal: summary.subtotal.to_string(),
            shipping: summary.shipping.to_string(),
            tax_label: format!("Tax ({})", summary.tax_rate.percent_label()),
            tax: summary.tax.to_string(),
            total: summary.total.to_string(),
        }
    }
}

impl From<&OrderConfirmation> for ModalView {
    fn from(confirmation: &OrderConfirmation) -> Self {
        ModalView::Confirmed {
            title: "Order Confirmed!",
            order_number: format!("#{}", confirmation.order_id),
            total: confirmation.total.to_string(),
        }
    }
}

// =============================================================================
// Projection
// =============================================================================

/// Renders controller state. `effect_of` reports the running row animation.
pub fn project(
    cart: &CartState,
    toasts: &[Toast],
    modal: &CheckoutModal,
    effect_of: impl Fn(&ItemId) -> Option<RowEffect>,
) -> CartView {
    let rows = cart
        .items()
        .iter()
        .map(|item| RowView {
            id: item.id().clone(),
            name: item.name().to_string(),
            unit_price: item.unit_price().to_string(),
            quantity: item.quantity(),
            line_total: item.line_total().to_string(),
            removing: item.status() == ItemStatus::PendingRemoval,
            effect: effect_of(item.id()),
        })
        .collect();

    let display = cart.display();
    let modal = match modal {
        CheckoutModal::Closed => None,
        CheckoutModal::Reviewing(summary) => Some(ModalView::from(summary)),
        CheckoutModal::Confirmed(confirmation) => Some(ModalView::from(confirmation)),
    };

    CartView {
        display,
        rows,
        subtotal: cart.subtotal().to_string(),
        item_count: format_item_count(cart.item_count()),
        empty_state: (display == CartDisplay::Empty).then(EmptyStateView::default),
        toasts: toasts.iter().map(ToastView::from).collect(),
        modal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::models::{LineItem, Money, Pricing};

    #[test]
    fn rows_and_totals_are_formatted() {
        let cart = CartState::from_items(vec![
            LineItem::new("1", "Widget", Money::from_cents(1000), 3).unwrap(),
        ])
        .unwrap();

        let view = project(&cart, &[], &CheckoutModal::Closed, |_| Some(RowEffect::Pulse));
        assert_eq!(view.display, CartDisplay::HasItems);
        assert_eq!(view.rows[0].line_total, "$30.00");
        assert_eq!(view.rows[0].effect, Some(RowEffect::Pulse));
        assert_eq!(view.subtotal, "$30.00");
        assert_eq!(view.item_count, "3 items");
        assert!(view.empty_state.is_none());
        assert!(view.modal.is_none());
    }

    #[test]
    fn empty_cart_shows_placeholder() {
        let view = project(&CartState::default(), &[], &CheckoutModal::Closed, |_| None);
        assert_eq!(view.display, CartDisplay::Empty);
        assert!(view.rows.is_empty());
        assert_eq!(view.empty_state, Some(EmptyStateView::default()));
        assert_eq!(view.item_count, "0 items");
    }

    #[test]
    fn review_modal_lists_each_charge() {
        let cart = CartState::from_items(vec![
            LineItem::new("1", "Widget", Money::from_cents(2500), 2).unwrap(),
        ])
        .unwrap();
        let mut modal = CheckoutModal::default();
        modal.open(cart.order_summary(Pricing::default()).unwrap());

        let view = project(&cart, &[], &modal, |_| None);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["modal"]["view"], "review");
        assert_eq!(json["modal"]["lines"][0]["label"], "Widget x2");
        assert_eq!(json["modal"]["taxLabel"], "Tax (8%)");
        assert_eq!(json["modal"]["tax"], "$4.00");
        assert_eq!(json["modal"]["total"], "$59.99");
    }
}
