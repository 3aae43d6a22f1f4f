//! Custom Axum extractors for request authentication.
//!
//! Provides:
//! - `SessionToken`: the raw session token carried by the request, if any.
//!   Looks at the `Ccms-Session` header first, then the `ccms_session`
//!   cookie.
//! - `AdminSession`: resolves the token through the access gate and
//!   rejects with `401` unless it belongs to a live admin session.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use ccms_core::gate::AuthState;
use ccms_core::store::Session;
use ccms_sdk::objects::ActionResponse;
use ccms_sdk::session::{SESSION_HEADER, token_from_cookie_header};
use std::convert::Infallible;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// SessionToken
// ---------------------------------------------------------------------------

/// The session token presented by the caller. Never rejects.
pub struct SessionToken(pub Option<String>);

impl SessionToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for SessionToken {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let from_header = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let token = from_header.or_else(|| {
            parts
                .headers
                .get_all(header::COOKIE)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .find_map(token_from_cookie_header)
        });

        Ok(SessionToken(token.map(str::to_string)))
    }
}

// ---------------------------------------------------------------------------
// AdminSession
// ---------------------------------------------------------------------------

/// A live admin session. Handlers taking this never run for anyone else.
pub struct AdminSession(pub Session);

/// Rejection for [`AdminSession`].
#[derive(Debug, thiserror::Error)]
#[error("admin session required")]
pub struct AdminSessionRequired;

impl IntoResponse for AdminSessionRequired {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(ActionResponse::failed(self.to_string())),
        )
            .into_response()
    }
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AdminSessionRequired;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Ok(token) = SessionToken::from_request_parts(parts, state).await;
        match state.gate.resolve(token.as_deref()).await {
            (AuthState::AuthenticatedAdmin, Some(session)) => Ok(AdminSession(session)),
            _ => Err(AdminSessionRequired),
        }
    }
}
