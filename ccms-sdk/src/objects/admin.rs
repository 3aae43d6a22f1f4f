//! Admin API request and response types.

use serde::{Deserialize, Serialize};

use super::document::ConfigDocument;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Credentials submitted to `POST /admin/login`.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub secret: String,
}

/// Body of `POST /admin/create-account`.
#[derive(Clone, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    pub identifier: String,
    pub secret: String,
}

// Hand-written so the secret never reaches a log line.
impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for CreateAccountRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateAccountRequest")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Generic `{ success, message }` reply used by every mutating endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// `GET /admin/login` body when the login form may be shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginPageResponse {
    pub authenticated: bool,
}

/// `GET /admin/dashboard` body: the signed-in admin and the document to edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub username: String,
    pub document: ConfigDocument,
}
