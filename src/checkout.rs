//! Checkout Modal
//!
//! The modal shows an [`OrderSummary`] computed once when checkout starts and
//! gates its two outcomes: cancel back to the cart, or confirm into a
//! terminal confirmation view.

use crate::cart::models::{OrderConfirmation, OrderSummary};

/// What closed (or tried to close) the modal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissTrigger {
    CancelButton,
    /// Click outside the modal content
    Backdrop,
    CancelKey,
    /// "Done" on the confirmation view
    Done,
}

/// Effect of a dismissal request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismissal {
    /// Nothing was open
    Ignored,
    /// Review closed, cart untouched
    Discarded,
    /// Confirmation closed; the session must start over
    ResetSession,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum CheckoutModal {
    #[default]
    Closed,
    Reviewing(OrderSummary),
    Confirmed(OrderConfirmation),
}

impl CheckoutModal {
    /// Shows `summary`, replacing whatever modal was open.
    pub fn open(&mut self, summary: OrderSummary) {
        *self = CheckoutModal::Reviewing(summary);
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, CheckoutModal::Closed)
    }

    /// Summary under review, if any
    pub fn summary(&self) -> Option<&OrderSummary> {
        match self {
            CheckoutModal::Reviewing(summary) => Some(summary),
            _ => None,
        }
    }

    pub fn confirmation(&self) -> Option<&OrderConfirmation> {
        match self {
            CheckoutModal::Confirmed(confirmation) => Some(confirmation),
            _ => None,
        }
    }

    /// Switches to the confirmation view.
    pub fn confirm(&mut self, confirmation: OrderConfirmation) {
        *self = CheckoutModal::Confirmed(confirmation);
    }

    pub fn dismiss(&mut self, trigger: DismissTrigger) -> Dismissal {
        let outcome = match self {
            CheckoutModal::Closed => return Dismissal::Ignored,
            // only the confirmation view has a Done button
            CheckoutModal::Reviewing(_) if trigger == DismissTrigger::Done => {
                return Dismissal::Ignored
            }
            CheckoutModal::Reviewing(_) => Dismissal::Discarded,
            CheckoutModal::Confirmed(_) => Dismissal::ResetSession,
        };
        *self = CheckoutModal::Closed;
        outcome
    }
}
