//! Input events and the session event loop
//!
//! The page sends every click and key press as a [`UiEvent`]. A
//! [`CartSession`] owns one controller plus the single subscription it reads
//! those events from, and wakes up on its own when a deferred task is due.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::cart::{controller::CartController, models::ItemId};
use crate::view::CartView;

// =============================================================================
// Events
// =============================================================================

/// Buttons found on the cart page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CartAction {
    Increase,
    Decrease,
    Remove,
    /// "Go Back" to the shop
    Back,
    /// "Continue" to checkout
    Continue,
}

/// Buttons and regions of the checkout modal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModalAction {
    Cancel,
    Confirm,
    /// Click outside the modal content
    Backdrop,
    Done,
}

/// One discrete user input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UiEvent {
    #[serde(rename_all = "camelCase")]
    Interaction {
        action: CartAction,
        #[serde(default)]
        target_item_id: Option<ItemId>,
    },
    Modal {
        action: ModalAction,
    },
    /// Global cancel key (Escape)
    CancelKey,
    /// Full page reload
    Reload,
}

impl UiEvent {
    pub fn interaction(action: CartAction, target: impl Into<ItemId>) -> Self {
        UiEvent::Interaction {
            action,
            target_item_id: Some(target.into()),
        }
    }

    pub fn modal(action: ModalAction) -> Self {
        UiEvent::Modal { action }
    }
}

// =============================================================================
// Session Loop
// =============================================================================

/// A controller bound to its event source
#[derive(Debug)]
pub struct CartSession {
    controller: CartController,
    events: mpsc::Receiver<UiEvent>,
    views: watch::Sender<CartView>,
}

impl CartSession {
    /// Binds `controller` to `events`. The returned receiver always holds the
    /// latest settled view.
    pub fn new(
        controller: CartController,
        events: mpsc::Receiver<UiEvent>,
    ) -> (Self, watch::Receiver<CartView>) {
        let (views, view_rx) = watch::channel(controller.view());
        (
            Self {
                controller,
                events,
                views,
            },
            view_rx,
        )
    }

    /// Processes events in arrival order until the source closes, then hands
    /// the controller back.
    pub async fn run(mut self) -> CartController {
        info!("cart session started");
        loop {
            self.controller.tick();
            self.publish();

            let wait = self
                .controller
                .next_deadline()
                .map(|due| due.saturating_sub(self.controller.now()));

            tokio::select! {
                event = self.events.recv() => match event {
                    Some(event) => {
                        let outcome = self.controller.handle(event);
                        debug!(?outcome, "event handled");
                    }
                    None => break,
                },
                _ = sleep_for(wait) => {}
            }
        }
        info!("cart session closed");
        self.controller
    }

    fn publish(&self) {
        let view = self.controller.view();
        self.views.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }
}

async fn sleep_for(wait: Option<Duration>) {
    match wait {
        Some(wait) => tokio::time::sleep(wait).await,
        None => std::future::pending::<()>().await,
    }
}
