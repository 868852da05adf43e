//! Error types
//!
//! Cart errors are recovered where they happen and turned into toast
//! feedback by the controller. Seed errors are raised while building the
//! initial cart. `ApiError` is the HTTP-facing error of the host.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::cart::models::ItemId;

// =============================================================================
// Cart Errors
// =============================================================================

/// Conditions a cart operation can end in without changing state
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    /// The referenced line item is no longer in the cart
    #[error("item {0} is not in the cart")]
    ItemNotFound(ItemId),

    /// A decrement was attempted at quantity 1
    #[error("item {0} is already at the minimum quantity")]
    MinimumQuantity(ItemId),

    /// Checkout was requested with no items
    #[error("the cart is empty")]
    EmptyCart,

    /// The item is fading out and ignores further actions
    #[error("item {0} is being removed")]
    RemovalPending(ItemId),
}

/// Problems with the initial line-item data
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("invalid price {0}: must be a finite, non-negative amount")]
    InvalidPrice(String),

    #[error("item {0} has quantity 0")]
    ZeroQuantity(ItemId),

    #[error("item id {0} appears more than once")]
    DuplicateItem(ItemId),
}

// =============================================================================
// HTTP Errors
// =============================================================================

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
}

/// Errors returned by the HTTP host
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, "bad_request", message),
        };

        let body = ErrorBody {
            error: ErrorInfo { code, message },
        };

        (status, Json(body)).into_response()
    }
}
