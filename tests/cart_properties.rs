//! Property tests for the cart controller
//!
//! Random click sequences against a manual clock; totals must stay settled
//! after every step.

use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use cart_page_rust::cart::models::{ItemId, Money, SeedItem};
use cart_page_rust::cart::{ActionOutcome, CartController};
use cart_page_rust::config::CartConfig;
use cart_page_rust::events::UiEvent;
use cart_page_rust::schedule::ManualClock;

#[derive(Debug, Clone)]
enum Step {
    Increase(usize),
    Decrease(usize),
    Remove(usize),
    Advance(u64),
    Checkout,
    Cancel,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0..4usize).prop_map(Step::Increase),
        (0..4usize).prop_map(Step::Decrease),
        (0..4usize).prop_map(Step::Remove),
        (0..4_000u64).prop_map(Step::Advance),
        Just(Step::Checkout),
        Just(Step::Cancel),
    ]
}

fn seed() -> impl Strategy<Value = Vec<SeedItem>> {
    prop::collection::vec((1..20_000u64, 1..6u32), 1..4).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (cents, quantity))| SeedItem {
                id: ItemId::from((i + 1).to_string()),
                name: format!("Item {}", i + 1),
                price: Money::from_cents(cents),
                quantity,
            })
            .collect()
    })
}

fn item_id(index: usize) -> ItemId {
    ItemId::from((index + 1).to_string())
}

fn assert_settled(c: &CartController) {
    let cart = c.cart();
    let subtotal: Money = cart.items().iter().map(|item| item.line_total()).sum();
    let count: u32 = cart.items().iter().map(|item| item.quantity()).sum();
    assert_eq!(cart.subtotal(), subtotal);
    assert_eq!(cart.item_count(), count);
    assert!(cart.items().iter().all(|item| item.quantity() >= 1));
}

proptest! {
    #[test]
    fn totals_stay_consistent(seed in seed(), steps in prop::collection::vec(step(), 0..40)) {
        let clock = ManualClock::new();
        let mut c = CartController::new(seed, CartConfig::default(), Arc::new(clock.clone())).unwrap();

        // (id, name, due) of every removal still fading out
        let mut removing: Vec<(ItemId, String, Duration)> = Vec::new();
        let transition = CartConfig::default().timing.removal_transition;

        for step in steps {
            // run anything already due so toast counts only reflect this step
            c.tick();
            let toasts_before = c.toasts().len();

            let outcome = match step {
                Step::Increase(i) => c.increase_quantity(&item_id(i)),
                Step::Decrease(i) => c.decrease_quantity(&item_id(i)),
                Step::Remove(i) => c.remove_item(&item_id(i)),
                Step::Checkout => c.proceed_to_checkout(),
                Step::Cancel => c.handle(UiEvent::CancelKey),
                Step::Advance(ms) => {
                    // short hops so a removal toast is still on screen when its removal lands
                    let mut left = ms;
                    while left > 0 {
                        let hop = left.min(100);
                        left -= hop;
                        clock.advance(Duration::from_millis(hop));
                        c.tick();

                        let now = c.now();
                        let (landed, waiting): (Vec<_>, Vec<_>) =
                            removing.drain(..).partition(|(_, _, due)| *due <= now);
                        removing = waiting;
                        for (id, name, _) in landed {
                            prop_assert!(c.cart().get(&id).is_none());
                            let text = format!("{name} removed from cart");
                            let shown = c.toasts().toasts().iter().filter(|t| t.text == text).count();
                            prop_assert_eq!(shown, 1);
                        }
                        assert_settled(&c);
                    }
                    continue;
                }
            };

            if let (Step::Remove(i), ActionOutcome::Scheduled) = (&step, &outcome) {
                let id = item_id(*i);
                let name = c.cart().get(&id).map(|item| item.name().to_string()).unwrap();
                removing.push((id, name, c.now() + transition));
            }

            let expected = match (&step, &outcome) {
                (Step::Cancel, _) | (Step::Checkout, ActionOutcome::Applied) => 0,
                (_, ActionOutcome::Applied | ActionOutcome::Rejected(_)) => 1,
                _ => 0,
            };
            prop_assert_eq!(c.toasts().len(), toasts_before + expected);
            assert_settled(&c);
        }
    }

    #[test]
    fn summary_total_adds_shipping_and_tax(seed in seed()) {
        let clock = ManualClock::new();
        let mut c = CartController::new(seed, CartConfig::default(), Arc::new(clock)).unwrap();

        let summary = c.compute_order_summary().unwrap();
        prop_assert_eq!(summary.subtotal, c.cart().subtotal());
        prop_assert_eq!(summary.total, summary.subtotal + summary.shipping + summary.tax);
        prop_assert_eq!(summary.shipping, Money::from_cents(599));
        prop_assert!(summary.lines.iter().all(|line| line.quantity >= 1));
    }
}
