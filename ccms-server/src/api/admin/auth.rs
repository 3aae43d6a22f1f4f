use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::header,
    response::{IntoResponse, Response},
};
use ccms_core::gate::AuthError;
use ccms_sdk::objects::{ActionResponse, CreateAccountRequest, LoginRequest};
use ccms_sdk::session::{clear_session_cookie, session_cookie};

use super::AdminApiError;
use crate::api::extractors::SessionToken;
use crate::state::AppState;

/// `POST /admin/login`: exchange credentials for a session cookie.
///
/// Every failure, including a valid account without the admin claim, is
/// the same `401 login failed`.
pub(super) async fn login(
    state: State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, AdminApiError> {
    let Json(body) = body.map_err(|e| AdminApiError::BadRequest(e.body_text()))?;
    let session_config = state.config.session().await;

    let issued = state
        .gate
        .login(body.identifier.trim(), &body.secret, session_config.ttl)
        .await
        .map_err(|e| {
            match &e {
                AuthError::Store(e) => tracing::error!(error = %e, "Login lookup failed"),
                AuthError::Password(e) => tracing::error!(error = %e, "Login hashing failed"),
                AuthError::SessionTtlOutOfRange => {
                    tracing::error!(ttl = %session_config.ttl, "Session lifetime out of range")
                }
                _ => tracing::debug!(identifier = %body.identifier, "Login rejected"),
            }
            AdminApiError::LoginFailed
        })?;

    let max_age = u64::try_from(session_config.ttl.whole_seconds()).unwrap_or(0);
    let cookie = session_cookie(&issued.token, max_age, session_config.secure_cookie);

    Ok(([(header::SET_COOKIE, cookie)], Json(ActionResponse::ok())).into_response())
}

/// `POST /admin/logout`: revoke the caller's session. Idempotent.
pub(super) async fn logout(
    state: State<AppState>,
    token: SessionToken,
) -> Result<Response, AdminApiError> {
    if let Some(token) = token.as_deref() {
        state.gate.logout(token).await?;
    }
    Ok((
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(ActionResponse::ok()),
    )
        .into_response())
}

/// `POST /admin/create-account`: replace the admin account.
///
/// Open while no admin exists; afterwards only an admin may call it. All
/// sessions, the caller's included, end with the old account.
pub(super) async fn create_account(
    state: State<AppState>,
    token: SessionToken,
    body: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<Response, AdminApiError> {
    let Json(body) = body.map_err(|e| AdminApiError::BadRequest(e.body_text()))?;
    if !state.gate.may_create_account(token.as_deref()).await {
        return Err(AdminApiError::Unauthorized);
    }

    state
        .gate
        .create_account(&body.identifier, &body.secret)
        .await?;

    Ok((
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(ActionResponse::ok()),
    )
        .into_response())
}
