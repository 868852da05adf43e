//! Line-Item Cart Controller
//!
//! The controller owns the cart, its toast queue, the checkout modal and
//! every deferred task of a single page session. All input arrives through
//! [`CartController::handle`]; timers advance through
//! [`CartController::tick`] against the injected [`Clock`].
//!
//! Errors never leave the controller. Each outcome is reported as an
//! [`ActionOutcome`] after the matching toast has been queued.

use std::{collections::HashMap, sync::Arc, time::Duration};
use tracing::{debug, info};

use super::{
    helpers::{
        format_item_summary, generate_order_id, quantity_updated_text, removed_text,
        EMPTY_CART_TEXT, GOING_BACK_TEXT, MINIMUM_QUANTITY_TEXT,
    },
    models::{ItemId, OrderConfirmation, OrderSummary, RowEffect, SeedItem},
    state::CartState,
};
use crate::checkout::{CheckoutModal, DismissTrigger, Dismissal};
use crate::config::CartConfig;
use crate::error::{CartError, SeedError};
use crate::events::{CartAction, ModalAction, UiEvent};
use crate::schedule::{Clock, Scheduler, TaskHandle};
use crate::toast::{Severity, ToastId, ToastQueue};
use crate::view::{self, CartView};

/// How an input was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// State changed immediately
    Applied,
    /// Accepted; completes when a deferred task runs
    Scheduled,
    /// Refused, with a toast telling the user why
    Rejected(CartError),
    /// Skipped silently
    Skipped(CartError),
    /// Nothing to act on (e.g. cancel with no modal open)
    Ignored,
}

impl ActionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ActionOutcome::Applied => "applied",
            ActionOutcome::Scheduled => "scheduled",
            ActionOutcome::Rejected(_) => "rejected",
            ActionOutcome::Skipped(_) => "skipped",
            ActionOutcome::Ignored => "ignored",
        }
    }
}

/// Work queued against the session clock
#[derive(Debug, Clone, PartialEq, Eq)]
enum Deferred {
    CompleteRemoval(ItemId),
    ClearEffect(ItemId),
    BeginToastExit(ToastId),
    DropToast(ToastId),
}

#[derive(Debug, Clone, Copy)]
struct ActiveEffect {
    effect: RowEffect,
    clear: TaskHandle,
}

/// In-memory controller for one cart page session
#[derive(Debug)]
pub struct CartController {
    cart: CartState,
    initial: CartState,
    toasts: ToastQueue,
    modal: CheckoutModal,
    effects: HashMap<ItemId, ActiveEffect>,
    scheduler: Scheduler<Deferred>,
    clock: Arc<dyn Clock>,
    config: CartConfig,
}

impl CartController {
    /// Creates a controller over the seed cart. The seed is kept so a reload
    /// can start the session over.
    pub fn new(
        seed: Vec<SeedItem>,
        config: CartConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SeedError> {
        let initial = CartState::from_seed(&seed)?;
        Ok(Self::from_state(initial, config, clock))
    }

    /// Creates a controller over an already validated cart.
    pub fn from_state(initial: CartState, config: CartConfig, clock: Arc<dyn Clock>) -> Self {
        info!(
            items = initial.items().len(),
            subtotal = %initial.subtotal(),
            "cart initialised"
        );

        Self {
            cart: initial.clone(),
            initial,
            toasts: ToastQueue::new(),
            modal: CheckoutModal::default(),
            effects: HashMap::new(),
            scheduler: Scheduler::new(),
            clock,
            config,
        }
    }

    pub fn cart(&self) -> &CartState {
        &self.cart
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    pub fn modal(&self) -> &CheckoutModal {
        &self.modal
    }

    /// Animation currently running on a row
    pub fn effect(&self, id: &ItemId) -> Option<RowEffect> {
        self.effects.get(id).map(|active| active.effect)
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// When the next deferred task is due
    pub fn next_deadline(&mut self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    pub fn view(&self) -> CartView {
        view::project(&self.cart, self.toasts.toasts(), &self.modal, |id| {
            self.effect(id)
        })
    }

    // =========================================================================
    // Event Dispatch
    // =========================================================================

    /// Single delegated handler for every page input.
    ///
    /// Deferred work that is already due runs first, so an event never sees
    /// state older than the clock.
    pub fn handle(&mut self, event: UiEvent) -> ActionOutcome {
        self.tick();
        debug!(?event, "dispatching event");

        match event {
            UiEvent::Interaction {
                action,
                target_item_id,
            } => match (action, target_item_id) {
                (CartAction::Increase, Some(id)) => self.increase_quantity(&id),
                (CartAction::Decrease, Some(id)) => self.decrease_quantity(&id),
                (CartAction::Remove, Some(id)) => self.remove_item(&id),
                (CartAction::Back, _) => self.go_back(),
                (CartAction::Continue, _) => self.proceed_to_checkout(),
                (_, None) => ActionOutcome::Ignored,
            },
            UiEvent::Modal { action } => match action {
                ModalAction::Cancel => self.dismiss_checkout(DismissTrigger::CancelButton),
                ModalAction::Backdrop => self.dismiss_checkout(DismissTrigger::Backdrop),
                ModalAction::Done => self.dismiss_checkout(DismissTrigger::Done),
                ModalAction::Confirm => match self.modal.summary().cloned() {
                    Some(summary) => {
                        self.confirm_order(&summary);
                        ActionOutcome::Applied
                    }
                    None => ActionOutcome::Ignored,
                },
            },
            UiEvent::CancelKey => self.dismiss_checkout(DismissTrigger::CancelKey),
            UiEvent::Reload => {
                self.reload();
                ActionOutcome::Applied
            }
        }
    }

    /// Runs every deferred task due at the current clock reading, in
    /// deadline order. Returns how many ran.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now();
        let mut ran = 0;
        while let Some((due, task)) = self.scheduler.pop_due(now) {
            self.run_deferred(due, task);
            ran += 1;
        }
        ran
    }

    // =========================================================================
    // Cart Operations
    // =========================================================================

    pub fn increase_quantity(&mut self, id: &ItemId) -> ActionOutcome {
        let now = self.clock.now();
        match self.cart.increase(id) {
            Ok(item) => {
                let text = quantity_updated_text(item);
                debug!(item = %id, quantity = item.quantity(), "quantity increased");
                self.start_effect(now, id, RowEffect::Pulse);
                self.notify(now, text, Severity::Success);
                ActionOutcome::Applied
            }
            Err(err) => self.recover(now, err),
        }
    }

    pub fn decrease_quantity(&mut self, id: &ItemId) -> ActionOutcome {
        let now = self.clock.now();
        match self.cart.decrease(id) {
            Ok(item) => {
                let text = quantity_updated_text(item);
                debug!(item = %id, quantity = item.quantity(), "quantity decreased");
                self.start_effect(now, id, RowEffect::Pulse);
                self.notify(now, text, Severity::Info);
                ActionOutcome::Applied
            }
            Err(err) => self.recover(now, err),
        }
    }

    /// Starts the fade-out; the item leaves the cart once the removal
    /// transition has elapsed.
    pub fn remove_item(&mut self, id: &ItemId) -> ActionOutcome {
        let now = self.clock.now();
        match self.cart.mark_for_removal(id) {
            Ok(_) => {
                debug!(item = %id, "removal started");
                let due = now + self.config.timing.removal_transition;
                self.scheduler
                    .schedule_at(due, Deferred::CompleteRemoval(id.clone()));
                ActionOutcome::Scheduled
            }
            Err(err) => self.recover(now, err),
        }
    }

    /// "Go Back" only acknowledges the click; navigation belongs to the host.
    pub fn go_back(&mut self) -> ActionOutcome {
        let now = self.clock.now();
        self.notify(now, GOING_BACK_TEXT, Severity::Info);
        ActionOutcome::Applied
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Snapshot of the cart for checkout. An empty cart is reported with a
    /// warning toast.
    pub fn compute_order_summary(&mut self) -> Result<OrderSummary, CartError> {
        match self.cart.order_summary(self.config.pricing) {
            Ok(summary) => Ok(summary),
            Err(err) => {
                let now = self.clock.now();
                self.notify(now, EMPTY_CART_TEXT, Severity::Warning);
                Err(err)
            }
        }
    }

    /// "Continue": opens the review modal, or refuses on an empty cart.
    pub fn proceed_to_checkout(&mut self) -> ActionOutcome {
        match self.compute_order_summary() {
            Ok(summary) => {
                info!(
                    items = %format_item_summary(&summary.lines),
                    total = %summary.total,
                    "checkout opened"
                );
                self.modal.open(summary);
                ActionOutcome::Applied
            }
            Err(err) => ActionOutcome::Rejected(err),
        }
    }

    /// Confirms `summary` and switches the modal to the confirmation view.
    /// Nothing is persisted; dismissing the confirmation reloads the session.
    pub fn confirm_order(&mut self, summary: &OrderSummary) -> OrderConfirmation {
        let confirmation = OrderConfirmation {
            order_id: generate_order_id(),
            total: summary.total,
        };
        info!(
            order = %confirmation.order_id,
            total = %confirmation.total,
            "order confirmed"
        );
        self.modal.confirm(confirmation.clone());
        confirmation
    }

    /// Closes the modal. Closing the confirmation starts the session over.
    pub fn dismiss_checkout(&mut self, trigger: DismissTrigger) -> ActionOutcome {
        match self.modal.dismiss(trigger) {
            Dismissal::Ignored => ActionOutcome::Ignored,
            Dismissal::Discarded => {
                debug!(?trigger, "checkout cancelled");
                ActionOutcome::Applied
            }
            Dismissal::ResetSession => {
                self.reload();
                ActionOutcome::Applied
            }
        }
    }

    /// Full session reset: seed cart, no toasts, no timers, modal closed.
    pub fn reload(&mut self) {
        info!("session reloaded");
        self.cart = self.initial.clone();
        self.toasts.clear();
        self.modal = CheckoutModal::Closed;
        self.effects.clear();
        self.scheduler.clear();
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn recover(&mut self, now: Duration, err: CartError) -> ActionOutcome {
        match err {
            CartError::MinimumQuantity(id) => {
                self.start_effect(now, &id, RowEffect::Shake);
                self.notify(now, MINIMUM_QUANTITY_TEXT, Severity::Warning);
                ActionOutcome::Rejected(CartError::MinimumQuantity(id))
            }
            CartError::EmptyCart => {
                self.notify(now, EMPTY_CART_TEXT, Severity::Warning);
                ActionOutcome::Rejected(err)
            }
            CartError::ItemNotFound(_) | CartError::RemovalPending(_) => {
                debug!(%err, "action skipped");
                ActionOutcome::Skipped(err)
            }
        }
    }

    fn notify(&mut self, at: Duration, text: impl Into<String>, severity: Severity) {
        let id = self.toasts.show(text, severity);
        let exit_at = at + self.config.timing.toast_lifetime;
        self.scheduler
            .schedule_at(exit_at, Deferred::BeginToastExit(id));
        self.scheduler.schedule_at(
            exit_at + self.config.timing.toast_exit,
            Deferred::DropToast(id),
        );
    }

    fn start_effect(&mut self, at: Duration, id: &ItemId, effect: RowEffect) {
        let duration = match effect {
            RowEffect::Pulse => self.config.timing.pulse,
            RowEffect::Shake => self.config.timing.shake,
        };
        if let Some(previous) = self.effects.remove(id) {
            self.scheduler.cancel(previous.clear);
        }
        let clear = self
            .scheduler
            .schedule_at(at + duration, Deferred::ClearEffect(id.clone()));
        self.effects.insert(id.clone(), ActiveEffect { effect, clear });
    }

    fn run_deferred(&mut self, at: Duration, task: Deferred) {
        match task {
            Deferred::CompleteRemoval(id) => {
                let Ok(item) = self.cart.complete_removal(&id) else {
                    return;
                };
                if let Some(active) = self.effects.remove(&id) {
                    self.scheduler.cancel(active.clear);
                }
                debug!(item = %id, subtotal = %self.cart.subtotal(), "item removed");
                self.notify(at, removed_text(&item), Severity::Error);
                if self.cart.is_empty() {
                    info!("cart is now empty");
                }
            }
            Deferred::ClearEffect(id) => {
                self.effects.remove(&id);
            }
            Deferred::BeginToastExit(id) => {
                self.toasts.begin_exit(id);
            }
            Deferred::DropToast(id) => {
                self.toasts.dismiss(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::models::{CartDisplay, Money};
    use crate::schedule::ManualClock;
    use crate::toast::ToastPhase;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn seed_item(id: &str, name: &str, cents: u64, quantity: u32) -> SeedItem {
        SeedItem {
            id: ItemId::from(id),
            name: name.to_string(),
            price: Money::from_cents(cents),
            quantity,
        }
    }

    fn controller(seed: Vec<SeedItem>) -> (CartController, ManualClock) {
        let clock = ManualClock::new();
        let controller =
            CartController::new(seed, CartConfig::default(), Arc::new(clock.clone())).unwrap();
        (controller, clock)
    }

    fn last_toast(controller: &CartController) -> (String, Severity) {
        let toast = controller.toasts().last().expect("a toast");
        (toast.text.clone(), toast.severity)
    }

    #[test]
    fn increase_updates_totals_and_toasts_success() {
        let (mut c, _) = controller(vec![seed_item("1", "Widget", 1000, 2)]);
        let id = ItemId::from("1");

        assert_eq!(c.increase_quantity(&id), ActionOutcome::Applied);

        let item = c.cart().get(&id).unwrap();
        assert_eq!(item.quantity(), 3);
        assert_eq!(item.line_total(), Money::from_cents(3000));
        assert_eq!(c.cart().subtotal(), Money::from_cents(3000));
        assert_eq!(
            last_toast(&c),
            ("Widget: quantity updated to 3".to_string(), Severity::Success)
        );
        assert_eq!(c.effect(&id), Some(RowEffect::Pulse));
    }

    #[test]
    fn decrease_at_minimum_warns_and_shakes() {
        let (mut c, clock) = controller(vec![seed_item("1", "Widget", 1000, 1)]);
        let id = ItemId::from("1");

        let outcome = c.decrease_quantity(&id);
        assert_eq!(outcome, ActionOutcome::Rejected(CartError::MinimumQuantity(id.clone())));
        assert_eq!(c.cart().get(&id).unwrap().quantity(), 1);
        assert_eq!(last_toast(&c).1, Severity::Warning);
        assert_eq!(c.toasts().len(), 1);
        assert_eq!(c.effect(&id), Some(RowEffect::Shake));

        clock.advance(ms(300));
        c.tick();
        assert_eq!(c.effect(&id), None);
    }

    #[test]
    fn decrease_above_minimum_toasts_info() {
        let (mut c, _) = controller(vec![seed_item("1", "Widget", 1000, 2)]);
        assert_eq!(c.decrease_quantity(&ItemId::from("1")), ActionOutcome::Applied);
        assert_eq!(
            last_toast(&c),
            ("Widget: quantity updated to 1".to_string(), Severity::Info)
        );
        assert_eq!(c.cart().item_count(), 1);
    }

    #[test]
    fn removal_completes_after_transition() {
        let (mut c, clock) = controller(vec![
            seed_item("1", "Widget", 1000, 1),
            seed_item("2", "Gadget", 500, 2),
        ]);
        let id = ItemId::from("1");

        assert_eq!(c.remove_item(&id), ActionOutcome::Scheduled);
        assert!(c.view().rows[0].removing);
        assert!(c.toasts().is_empty());

        clock.advance(ms(299));
        c.tick();
        assert!(c.cart().get(&id).is_some());

        clock.advance(ms(1));
        assert_eq!(c.tick(), 1);
        assert!(c.cart().get(&id).is_none());
        assert_eq!(c.cart().subtotal(), Money::from_cents(1000));
        assert_eq!(c.cart().item_count(), 2);
        assert_eq!(
            last_toast(&c),
            ("Widget removed from cart".to_string(), Severity::Error)
        );
        assert_eq!(c.cart().display(), CartDisplay::HasItems);
    }

    #[test]
    fn removing_last_item_enters_empty_state() {
        let (mut c, clock) = controller(vec![seed_item("1", "Widget", 1000, 1)]);
        c.remove_item(&ItemId::from("1"));
        clock.advance(ms(300));
        c.tick();

        assert!(c.cart().is_empty());
        let view = c.view();
        assert_eq!(view.display, CartDisplay::Empty);
        assert!(view.empty_state.is_some());
    }

    #[test]
    fn item_being_removed_ignores_further_clicks() {
        let (mut c, clock) = controller(vec![seed_item("1", "Widget", 1000, 1)]);
        let id = ItemId::from("1");

        c.remove_item(&id);
        assert_eq!(
            c.increase_quantity(&id),
            ActionOutcome::Skipped(CartError::RemovalPending(id.clone()))
        );
        assert_eq!(
            c.remove_item(&id),
            ActionOutcome::Skipped(CartError::RemovalPending(id.clone()))
        );

        clock.advance(ms(300));
        c.tick();
        assert_eq!(c.toasts().len(), 1);
        assert_eq!(
            c.remove_item(&id),
            ActionOutcome::Skipped(CartError::ItemNotFound(id.clone()))
        );
        assert_eq!(c.cart().subtotal(), Money::ZERO);
    }

    #[test]
    fn toasts_expire_after_lifetime_and_exit() {
        let (mut c, clock) = controller(vec![seed_item("1", "Widget", 1000, 1)]);
        c.go_back();
        clock.advance(ms(1000));
        c.increase_quantity(&ItemId::from("1"));
        assert_eq!(c.toasts().len(), 2);

        clock.advance(ms(2000));
        c.tick();
        assert_eq!(c.toasts().toasts()[0].phase, ToastPhase::Exiting);
        assert_eq!(c.toasts().toasts()[1].phase, ToastPhase::Visible);

        clock.advance(ms(300));
        c.tick();
        assert_eq!(c.toasts().len(), 1);

        clock.advance(ms(1000));
        c.tick();
        assert!(c.toasts().is_empty());
    }

    #[test]
    fn checkout_summary_matches_scenario() {
        let (mut c, _) = controller(vec![
            seed_item("1", "Widget", 1000, 2),
            seed_item("2", "Gadget", 1500, 2),
        ]);

        let summary = c.compute_order_summary().unwrap();
        assert_eq!(summary.subtotal, Money::from_cents(5000));
        assert_eq!(summary.tax, Money::from_cents(400));
        assert_eq!(summary.total, Money::from_cents(5999));
        assert!(c.toasts().is_empty());
    }

    #[test]
    fn checkout_on_empty_cart_is_refused() {
        let (mut c, _) = controller(Vec::new());

        assert_eq!(c.compute_order_summary(), Err(CartError::EmptyCart));
        assert_eq!(
            c.proceed_to_checkout(),
            ActionOutcome::Rejected(CartError::EmptyCart)
        );
        assert!(!c.modal().is_open());
        assert_eq!(
            last_toast(&c),
            ("Your cart is empty!".to_string(), Severity::Warning)
        );
    }

    #[test]
    fn summary_is_frozen_while_cart_changes() {
        let (mut c, _) = controller(vec![seed_item("1", "Widget", 1000, 1)]);
        c.proceed_to_checkout();
        c.increase_quantity(&ItemId::from("1"));

        let summary = c.modal().summary().unwrap();
        assert_eq!(summary.subtotal, Money::from_cents(1000));
        assert_eq!(c.cart().subtotal(), Money::from_cents(2000));
    }

    #[test]
    fn confirm_then_done_reloads_seed() {
        let (mut c, _) = controller(vec![seed_item("1", "Widget", 1000, 1)]);
        c.handle(UiEvent::interaction(CartAction::Increase, "1"));
        c.handle(UiEvent::interaction(CartAction::Continue, "1"));
        assert_eq!(c.handle(UiEvent::modal(ModalAction::Confirm)), ActionOutcome::Applied);

        let confirmation = c.modal().confirmation().unwrap();
        assert_eq!(confirmation.total, Money::from_cents(2000 + 599 + 160));
        assert_eq!(confirmation.order_id.len(), 8);

        assert_eq!(c.handle(UiEvent::modal(ModalAction::Done)), ActionOutcome::Applied);
        assert!(!c.modal().is_open());
        assert!(c.toasts().is_empty());
        assert_eq!(c.cart().get(&ItemId::from("1")).unwrap().quantity(), 1);
        assert_eq!(c.next_deadline(), None);
    }

    #[test]
    fn cancel_key_closes_review_without_side_effects() {
        let (mut c, _) = controller(vec![seed_item("1", "Widget", 1000, 1)]);
        c.proceed_to_checkout();
        let before = c.cart().clone();

        assert_eq!(c.handle(UiEvent::CancelKey), ActionOutcome::Applied);
        assert!(!c.modal().is_open());
        assert_eq!(c.cart(), &before);
        assert_eq!(c.handle(UiEvent::CancelKey), ActionOutcome::Ignored);
    }

    #[test]
    fn handle_runs_due_removal_before_the_next_event() {
        let (mut c, clock) = controller(vec![
            seed_item("1", "Widget", 1000, 1),
            seed_item("2", "Gadget", 500, 1),
        ]);
        c.handle(UiEvent::interaction(CartAction::Remove, "1"));
        clock.advance(ms(300));

        c.handle(UiEvent::interaction(CartAction::Continue, "2"));
        let summary = c.modal().summary().unwrap();
        assert_eq!(summary.lines.len(), 1);
        assert_eq!(summary.subtotal, Money::from_cents(500));
    }

    #[test]
    fn checkout_during_removal_matches_cart_subtotal() {
        let (mut c, clock) = controller(vec![
            seed_item("1", "Widget", 1000, 1),
            seed_item("2", "Gadget", 4000, 1),
        ]);
        c.handle(UiEvent::interaction(CartAction::Remove, "2"));
        clock.advance(ms(100));

        assert_eq!(
            c.handle(UiEvent::interaction(CartAction::Continue, "1")),
            ActionOutcome::Applied
        );
        let summary = c.modal().summary().unwrap();
        assert_eq!(summary.subtotal, c.cart().subtotal());
        assert_eq!(summary.subtotal, Money::from_cents(5000));
        assert_eq!(summary.lines.len(), 2);
    }

    #[test]
    fn interaction_without_target_is_ignored() {
        let (mut c, _) = controller(vec![seed_item("1", "Widget", 1000, 1)]);
        let outcome = c.handle(UiEvent::Interaction {
            action: CartAction::Increase,
            target_item_id: None,
        });
        assert_eq!(outcome, ActionOutcome::Ignored);
        assert!(c.toasts().is_empty());
    }

    #[test]
    fn unknown_item_is_skipped_silently() {
        let (mut c, _) = controller(vec![seed_item("1", "Widget", 1000, 1)]);
        let missing = ItemId::from("42");
        assert_eq!(
            c.decrease_quantity(&missing),
            ActionOutcome::Skipped(CartError::ItemNotFound(missing.clone()))
        );
        assert!(c.toasts().is_empty());
    }
}
