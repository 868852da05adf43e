//! Cart page route handlers
//!
//! `GET /cart` returns the session's current view; `POST /cart/events`
//! dispatches one page event and returns the resulting view. Sessions are
//! tracked with the `cart_session` cookie.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::events::UiEvent;
use crate::state::SharedState;
use crate::view::CartView;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "cart_session";

/// Creates routes for cart page operations
pub fn routes() -> axum::Router<SharedState> {
    Router::new()
        .route("/cart", get(get_cart))
        .route("/cart/events", post(post_event))
}

/// Response for event dispatch
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    /// How the controller resolved the event
    pub outcome: &'static str,

    /// View after the event settled
    pub view: CartView,
}

/// Endpoint: GET /cart
/// Renders the session's cart after running any timers that are due.
/// Sessions are only stored once they send an event.
async fn get_cart(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let (session_id, is_new_session) = resolve_session_id(&headers);

    let view = match state.sessions.get_mut(&session_id) {
        Some(mut controller) => {
            controller.tick();
            controller.view()
        }
        None => state.seed_view(),
    };

    with_session_cookie(Json(view).into_response(), &session_id, is_new_session)
}

/// Endpoint: POST /cart/events
/// Feeds one page event to the session's controller.
async fn post_event(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Result<Json<UiEvent>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(event) = body.map_err(|e| {
        tracing::warn!("rejected event payload: {}", e.body_text());
        ApiError::bad_request(e.body_text())
    })?;

    let (session_id, is_new_session) = resolve_session_id(&headers);

    let response = state.with_session(&session_id, |controller| {
        let outcome = controller.handle(event);
        EventResponse {
            outcome: outcome.label(),
            view: controller.view(),
        }
    });

    Ok(with_session_cookie(
        Json(response).into_response(),
        &session_id,
        is_new_session,
    ))
}

/// Returns the session id from the `cart_session` cookie, or a fresh one.
/// The flag is `true` when the id was just generated.
pub fn resolve_session_id(headers: &HeaderMap) -> (String, bool) {
    let existing = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string());

    match existing {
        Some(id) => (id, false),
        None => (Uuid::new_v4().simple().to_string(), true),
    }
}

fn with_session_cookie(mut response: Response, session_id: &str, is_new_session: bool) -> Response {
    if is_new_session {
        let cookie_val = format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly");
        if let Ok(value) = HeaderValue::from_str(&cookie_val) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_is_read_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; cart_session=abc123"),
        );
        assert_eq!(resolve_session_id(&headers), ("abc123".to_string(), false));
    }

    #[test]
    fn missing_cookie_starts_a_session() {
        let (id, is_new) = resolve_session_id(&HeaderMap::new());
        assert!(is_new);
        assert_eq!(id.len(), 32);
    }
}
