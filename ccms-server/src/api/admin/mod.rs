//! Admin API handlers.
//!
//! Mutating endpoints answer with `{ success, message }`. The gated page
//! endpoints answer with JSON when allowed and with a `303` redirect
//! otherwise.
//!
//! # Endpoints
//!
//! - `POST /config`               – apply a partial update (admin session)
//! - `POST /admin/login`          – open a session, set the session cookie
//! - `POST /admin/logout`         – revoke the session, clear the cookie
//! - `POST /admin/create-account` – replace the admin account
//! - `GET  /admin/login`          – login page state (gated)
//! - `GET  /admin`, `/admin/dashboard` – editor data (gated)

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use ccms_core::gate::AuthError;
use ccms_core::merge::MergeError;
use ccms_core::store::StoreError;
use ccms_sdk::objects::ActionResponse;

use crate::state::AppState;

mod auth;
mod pages;
mod update_config;

/// Build the Admin API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/config", post(update_config::update_config))
        .route("/admin/login", get(pages::login_page).post(auth::login))
        .route("/admin/logout", post(auth::logout))
        .route("/admin/create-account", post(auth::create_account))
        .route("/admin", get(pages::dashboard))
        .route("/admin/dashboard", get(pages::dashboard))
}

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

/// Errors that can occur in Admin API handlers.
#[derive(Debug)]
pub(crate) enum AdminApiError {
    /// Malformed or rejected request body.
    BadRequest(String),
    LoginFailed,
    Unauthorized,
    Persistence(StoreError),
    Internal(String),
}

impl From<MergeError> for AdminApiError {
    fn from(e: MergeError) -> Self {
        match e {
            MergeError::Validation(e) => AdminApiError::BadRequest(e.to_string()),
            MergeError::Persistence(e) => AdminApiError::Persistence(e),
        }
    }
}

impl From<AuthError> for AdminApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::LoginFailed => AdminApiError::LoginFailed,
            AuthError::MissingCredentials => AdminApiError::BadRequest(e.to_string()),
            AuthError::SessionTtlOutOfRange => AdminApiError::Internal(e.to_string()),
            AuthError::Store(e) => AdminApiError::Persistence(e),
            AuthError::Password(e) => AdminApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AdminApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AdminApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AdminApiError::LoginFailed => {
                (StatusCode::UNAUTHORIZED, AuthError::LoginFailed.to_string())
            }
            AdminApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "admin session required".to_string(),
            ),
            AdminApiError::Persistence(e) => {
                tracing::error!(error = %e, "Admin API persistence error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to save changes".to_string(),
                )
            }
            AdminApiError::Internal(e) => {
                tracing::error!(error = %e, "Admin API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(ActionResponse::failed(message))).into_response()
    }
}
