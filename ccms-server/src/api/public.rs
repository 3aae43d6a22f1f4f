//! Public API handlers.
//!
//! These endpoints back the checkout page and need no authentication.
//! Backend read failures degrade to the default document.
//!
//! # Endpoints
//!
//! - `GET /config`   – the full configuration document
//! - `GET /page`     – the page view, without gateway credentials
//! - `GET /checkout` – redirect to the active gateway's checkout URL

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use ccms_core::render::{CheckoutError, checkout_target, page_view};
use ccms_sdk::objects::ActionResponse;

use crate::state::AppState;

/// Build the Public API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/config", get(get_config))
        .route("/page", get(get_page))
        .route("/checkout", get(checkout))
}

/// `GET /config`: the current document, including gateway credentials.
async fn get_config(state: State<AppState>) -> impl IntoResponse {
    Json(state.merge.get().await)
}

/// `GET /page`: what the checkout page renders.
async fn get_page(state: State<AppState>) -> impl IntoResponse {
    let document = state.merge.get().await;
    Json(page_view(&document))
}

/// `GET /checkout`: the checkout button.
///
/// Redirects (303) to the active gateway, or explains why it cannot.
async fn checkout(state: State<AppState>) -> Result<Redirect, PublicApiError> {
    let document = state.merge.get().await;
    let target = checkout_target(&document)?;
    Ok(Redirect::to(target.as_str()))
}

/// Errors that can occur in Public API handlers.
#[derive(Debug)]
pub(crate) enum PublicApiError {
    Checkout(CheckoutError),
}

impl From<CheckoutError> for PublicApiError {
    fn from(e: CheckoutError) -> Self {
        PublicApiError::Checkout(e)
    }
}

impl IntoResponse for PublicApiError {
    fn into_response(self) -> Response {
        match self {
            PublicApiError::Checkout(e) => {
                tracing::warn!(error = %e, "Checkout requested without a usable gateway");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(ActionResponse::failed(e.to_string())),
                )
                    .into_response()
            }
        }
    }
}
