use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use ccms_sdk::objects::{ActionResponse, ConfigPatch};

use super::AdminApiError;
use crate::api::extractors::AdminSession;
use crate::state::AppState;

/// `POST /config`: merge a partial update into the document.
///
/// An undecodable body (e.g. an unknown language) is a validation failure
/// like any other and is answered with `400`.
pub(super) async fn update_config(
    state: State<AppState>,
    AdminSession(session): AdminSession,
    body: Result<Json<ConfigPatch>, JsonRejection>,
) -> Result<impl IntoResponse, AdminApiError> {
    let Json(patch) = body.map_err(|e| AdminApiError::BadRequest(e.body_text()))?;

    state.merge.update(patch).await?;
    tracing::info!(username = %session.username, "Configuration updated");

    Ok(Json(ActionResponse::ok()))
}
