//! Cart Page Library
//!
//! This library provides an interactive line-item cart controller: quantity
//! controls, timed removal, toast feedback and a checkout modal, driven by
//! discrete page events and rendered through a pure view projection.

// Domain modules
pub mod cart;
pub mod checkout;
pub mod events;
pub mod toast;
pub mod view;

// Infrastructure
pub mod config;
pub mod error;
pub mod router;
pub mod schedule;
pub mod state;
