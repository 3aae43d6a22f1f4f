//! Persistence collaborators.
//!
//! The merge service and the access gate only see the two traits below.
//! [`postgres`] backs them with PostgreSQL; [`memory`] keeps everything in
//! process memory (fallback backend and test double).

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use ccms_sdk::objects::{ConfigDocument, Gateway, PageContent, PageStyle};
use thiserror::Error;
use uuid::Uuid;

pub use memory::{MemoryContentStore, MemoryIdentityStore};
pub use postgres::{PgContentStore, PgIdentityStore};

/// Errors raised by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A document could not be encoded for storage
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend cannot be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// A document version as it sits in the store: one raw JSON value per
/// section, any of which may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub version: i64,
    pub page_content: Option<serde_json::Value>,
    pub page_style: Option<serde_json::Value>,
    pub payment_gateways: Option<serde_json::Value>,
    pub active_gateway_id: Option<String>,
}

impl StoredDocument {
    /// Decode into a [`ConfigDocument`].
    ///
    /// Returns `None` when the version is structurally incomplete, i.e. any
    /// of the three sections is missing or does not decode.
    pub fn decode(&self) -> Option<ConfigDocument> {
        let page_content: PageContent = serde_json::from_value(self.page_content.clone()?).ok()?;
        let page_style: PageStyle = serde_json::from_value(self.page_style.clone()?).ok()?;
        let payment_gateways: Vec<Gateway> =
            serde_json::from_value(self.payment_gateways.clone()?).ok()?;
        Some(ConfigDocument {
            page_content,
            page_style,
            payment_gateways,
            active_gateway_id: self.active_gateway_id.clone(),
        })
    }
}

/// Column-mapped form of a document ready to be appended.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentColumns {
    pub page_content: serde_json::Value,
    pub page_style: serde_json::Value,
    pub payment_gateways: serde_json::Value,
    pub active_gateway_id: Option<String>,
}

impl DocumentColumns {
    pub fn encode(document: &ConfigDocument) -> Result<Self, serde_json::Error> {
        Ok(Self {
            page_content: serde_json::to_value(&document.page_content)?,
            page_style: serde_json::to_value(&document.page_style)?,
            payment_gateways: serde_json::to_value(&document.payment_gateways)?,
            active_gateway_id: document.active_gateway_id.clone(),
        })
    }
}

/// Holds the append-only sequence of document versions. The newest version
/// wins.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// The newest stored version, if any.
    async fn latest(&self) -> Result<Option<StoredDocument>, StoreError>;

    /// Append `document` as a new version and return its version number.
    async fn append(&self, document: &ConfigDocument) -> Result<i64, StoreError>;
}

// ---------------------------------------------------------------------------
// Identities and sessions
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    /// argon2 PHC string; carries its own salt.
    pub password_hash: String,
    pub is_admin: bool,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("is_admin", &self.is_admin)
            .finish_non_exhaustive()
    }
}

/// A server-side session, addressed by the digest of its bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token_hash: String,
    pub user_id: Uuid,
    pub username: String,
    /// The admin-privilege claim, taken from the identity at login.
    pub is_admin: bool,
    pub created_at: time::OffsetDateTime,
    pub expires_at: time::OffsetDateTime,
}

impl Session {
    pub fn is_expired(&self, now: time::OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}

/// Identity and session storage used by the access gate.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_identity(&self, username: &str) -> Result<Option<Identity>, StoreError>;

    /// Whether any identity carries the admin privilege.
    async fn has_admin(&self) -> Result<bool, StoreError>;

    /// Replace every identity (and every session) with a single admin.
    async fn replace_admin(&self, username: &str, password_hash: &str) -> Result<(), StoreError>;

    async fn insert_session(&self, session: &Session) -> Result<(), StoreError>;

    /// Unexpired session for `token_hash`.
    async fn find_session(&self, token_hash: &str) -> Result<Option<Session>, StoreError>;

    /// Remove a session. Removing an unknown session succeeds.
    async fn delete_session(&self, token_hash: &str) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_complete_document() {
        let doc = ConfigDocument::default();
        let cols = DocumentColumns::encode(&doc).unwrap();
        let stored = StoredDocument {
            version: 1,
            page_content: Some(cols.page_content),
            page_style: Some(cols.page_style),
            payment_gateways: Some(cols.payment_gateways),
            active_gateway_id: cols.active_gateway_id,
        };
        assert_eq!(stored.decode(), Some(doc));
    }

    #[test]
    fn test_decode_missing_section() {
        let cols = DocumentColumns::encode(&ConfigDocument::default()).unwrap();
        let stored = StoredDocument {
            version: 1,
            page_content: Some(cols.page_content),
            page_style: None,
            payment_gateways: Some(cols.payment_gateways),
            active_gateway_id: None,
        };
        assert_eq!(stored.decode(), None);
    }

    #[test]
    fn test_decode_malformed_section() {
        let cols = DocumentColumns::encode(&ConfigDocument::default()).unwrap();
        let stored = StoredDocument {
            version: 1,
            page_content: Some(serde_json::json!({ "title": "only a title" })),
            page_style: Some(cols.page_style),
            payment_gateways: Some(cols.payment_gateways),
            active_gateway_id: None,
        };
        assert_eq!(stored.decode(), None);
    }
}
