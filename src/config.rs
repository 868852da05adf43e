//! Configuration
//!
//! [`CartConfig`] carries the pricing and timing constants a controller runs
//! with. [`Config`] is the host configuration, loaded from environment
//! variables (optionally through a `.env` file):
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:8000`)
//! - `RUST_LOG` - Log filter (default: `info`)
//! - `CART_SEED_PATH` - JSON array of seed items (default: built-in demo cart)
//! - `CART_SHIPPING` - Flat shipping charge (default: `5.99`)
//! - `CART_TAX_RATE` - Tax rate as a fraction (default: `0.08`)
//! - `CART_REMOVAL_MS` - Row removal transition (default: `300`)
//! - `CART_TOAST_MS` - Toast lifetime before it slides out (default: `3000`)
//! - `CART_TOAST_EXIT_MS` - Toast exit transition (default: `300`)

use anyhow::{Context, Result};
use std::{env, path::PathBuf, time::Duration};

use crate::cart::models::{Money, Pricing, SeedItem, TaxRate};

// =============================================================================
// Controller Configuration
// =============================================================================

/// Durations of every timed transition on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub removal_transition: Duration,
    pub toast_lifetime: Duration,
    pub toast_exit: Duration,
    pub pulse: Duration,
    pub shake: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            removal_transition: Duration::from_millis(300),
            toast_lifetime: Duration::from_millis(3_000),
            toast_exit: Duration::from_millis(300),
            pulse: Duration::from_millis(150),
            shake: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartConfig {
    pub pricing: Pricing,
    pub timing: Timing,
}

// =============================================================================
// Host Configuration
// =============================================================================

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub log_level: String,
    pub seed_path: Option<PathBuf>,
    pub cart: CartConfig,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or money variable cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let seed_path = env::var("CART_SEED_PATH").ok().map(PathBuf::from);

        let shipping = match env::var("CART_SHIPPING") {
            Ok(raw) => Money::parse(&raw).context("CART_SHIPPING must be a money amount")?,
            Err(_) => Pricing::default().shipping,
        };

        let tax_rate = match env::var("CART_TAX_RATE") {
            Ok(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(TaxRate::from_fraction)
                .with_context(|| format!("CART_TAX_RATE must be a fraction in 0..=1, got '{raw}'"))?,
            Err(_) => Pricing::default().tax_rate,
        };

        let defaults = Timing::default();
        let timing = Timing {
            removal_transition: millis_var("CART_REMOVAL_MS", defaults.removal_transition)?,
            toast_lifetime: millis_var("CART_TOAST_MS", defaults.toast_lifetime)?,
            toast_exit: millis_var("CART_TOAST_EXIT_MS", defaults.toast_exit)?,
            ..defaults
        };

        Ok(Self {
            listen_addr,
            log_level,
            seed_path,
            cart: CartConfig {
                pricing: Pricing { shipping, tax_rate },
                timing,
            },
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `listen_addr` is not `host:port` or the toast
    /// lifetime is zero.
    pub fn validate(&self) -> Result<()> {
        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if self.cart.timing.toast_lifetime.is_zero() {
            anyhow::bail!("CART_TOAST_MS must be greater than 0");
        }

        Ok(())
    }

    /// Reads the seed cart from `seed_path`, or returns the demo cart.
    pub fn load_seed(&self) -> Result<Vec<SeedItem>> {
        match &self.seed_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read seed file {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("failed to parse seed file {}", path.display()))
            }
            None => Ok(demo_seed()),
        }
    }

    /// Prints configuration summary.
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Log level: {}", self.log_level);
        match &self.seed_path {
            Some(path) => tracing::info!("  Seed: {}", path.display()),
            None => tracing::info!("  Seed: built-in demo cart"),
        }
        tracing::info!(
            "  Shipping: {}, tax: {}",
            self.cart.pricing.shipping,
            self.cart.pricing.tax_rate.percent_label()
        );
    }
}

fn millis_var(name: &str, default: Duration) -> Result<Duration> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .with_context(|| format!("{name} must be a whole number of milliseconds")),
        Err(_) => Ok(default),
    }
}

/// Cart shown when no seed file is configured
pub fn demo_seed() -> Vec<SeedItem> {
    [
        ("1", "Cotton T-shirt", 4_400, 1),
        ("2", "Denim Jacket", 8_900, 1),
        ("3", "Canvas Sneakers", 6_500, 2),
    ]
    .into_iter()
    .map(|(id, name, cents, quantity)| SeedItem {
        id: id.into(),
        name: name.to_string(),
        price: Money::from_cents(cents),
        quantity,
    })
    .collect()
}

/// Loads and validates configuration from environment variables.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
