//! Host Application State
//!
//! One [`CartController`] per browser session, each running on its own
//! session clock.

use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;

use crate::cart::{controller::CartController, models::SeedItem, state::CartState};
use crate::checkout::CheckoutModal;
use crate::config::CartConfig;
use crate::error::SeedError;
use crate::schedule::TokioClock;
use crate::view::{self, CartView};

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

/// Core application state containing the live cart sessions
#[derive(Debug)]
pub struct AppState {
    /// Controllers keyed by session id.
    /// DashMap allows concurrent access without external Mutexes.
    pub sessions: DashMap<String, CartController>,

    /// Validated starting cart for every new session
    seed: CartState,

    config: CartConfig,
}

impl AppState {
    /// Validates the seed once so sessions can be created infallibly.
    pub fn new(seed: &[SeedItem], config: CartConfig) -> Result<Self, SeedError> {
        Ok(Self {
            sessions: DashMap::new(),
            seed: CartState::from_seed(seed)?,
            config,
        })
    }

    /// View of a session that has not interacted yet. Nothing is stored.
    pub fn seed_view(&self) -> CartView {
        view::project(&self.seed, &[], &CheckoutModal::Closed, |_| None)
    }

    /// Runs `f` against the session's controller, creating it on first use.
    pub fn with_session<R>(&self, session_id: &str, f: impl FnOnce(&mut CartController) -> R) -> R {
        let mut controller = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                info!(session = %session_id, "new cart session");
                CartController::from_state(
                    self.seed.clone(),
                    self.config,
                    Arc::new(TokioClock::new()),
                )
            });
        f(controller.value_mut())
    }
}
