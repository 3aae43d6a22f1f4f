use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use ccms_core::gate::{AdminRoute, AuthState, GateDecision, LOGIN_PATH, decide};
use ccms_sdk::objects::{DashboardResponse, LoginPageResponse};

use crate::api::extractors::SessionToken;
use crate::state::AppState;

/// `GET /admin/login`
pub(super) async fn login_page(state: State<AppState>, token: SessionToken) -> Response {
    let (auth, _) = state.gate.resolve(token.as_deref()).await;
    match decide(auth, AdminRoute::Login) {
        GateDecision::Allow => Json(LoginPageResponse {
            authenticated: auth != AuthState::Unauthenticated,
        })
        .into_response(),
        other => redirect(other),
    }
}

/// `GET /admin` and `GET /admin/dashboard`
pub(super) async fn dashboard(state: State<AppState>, token: SessionToken) -> Response {
    let (auth, session) = state.gate.resolve(token.as_deref()).await;
    match (decide(auth, AdminRoute::Protected), session) {
        (GateDecision::Allow, Some(session)) => Json(DashboardResponse {
            username: session.username,
            document: state.merge.get().await,
        })
        .into_response(),
        (GateDecision::Allow, None) => redirect(GateDecision::RedirectToLogin),
        (other, _) => redirect(other),
    }
}

/// 303 to wherever `decision` points. Only called for redirects.
fn redirect(decision: GateDecision) -> Response {
    Redirect::to(decision.location().unwrap_or(LOGIN_PATH)).into_response()
}
