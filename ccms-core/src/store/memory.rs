//! In-process stores.
//!
//! Used when no database is configured and as the backing store in tests.
//! State is created with the store and lives as long as it does.

use async_trait::async_trait;
use ccms_sdk::objects::ConfigDocument;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    ContentStore, DocumentColumns, Identity, IdentityStore, Session, StoreError, StoredDocument,
};

/// Append-only vector of document versions.
#[derive(Default)]
pub struct MemoryContentStore {
    versions: RwLock<Vec<StoredDocument>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw version, bypassing encoding. Lets callers seed
    /// incomplete versions.
    pub async fn push_raw(&self, mut stored: StoredDocument) {
        let mut versions = self.versions.write().await;
        stored.version = versions.len() as i64 + 1;
        versions.push(stored);
    }

    pub async fn version_count(&self) -> usize {
        self.versions.read().await.len()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn latest(&self) -> Result<Option<StoredDocument>, StoreError> {
        Ok(self.versions.read().await.last().cloned())
    }

    async fn append(&self, document: &ConfigDocument) -> Result<i64, StoreError> {
        let cols = DocumentColumns::encode(document)?;
        let mut versions = self.versions.write().await;
        let version = versions.len() as i64 + 1;
        versions.push(StoredDocument {
            version,
            page_content: Some(cols.page_content),
            page_style: Some(cols.page_style),
            payment_gateways: Some(cols.payment_gateways),
            active_gateway_id: cols.active_gateway_id,
        });
        Ok(version)
    }
}

/// Identities keyed by username, sessions keyed by token digest.
#[derive(Default)]
pub struct MemoryIdentityStore {
    identities: RwLock<HashMap<String, Identity>>,
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite a single identity, admin or not.
    pub async fn insert_identity(&self, username: &str, password_hash: &str, is_admin: bool) {
        self.identities.write().await.insert(
            username.to_owned(),
            Identity {
                id: Uuid::now_v7(),
                username: username.to_owned(),
                password_hash: password_hash.to_owned(),
                is_admin,
            },
        );
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_identity(&self, username: &str) -> Result<Option<Identity>, StoreError> {
        Ok(self.identities.read().await.get(username).cloned())
    }

    async fn has_admin(&self) -> Result<bool, StoreError> {
        Ok(self.identities.read().await.values().any(|i| i.is_admin))
    }

    async fn replace_admin(&self, username: &str, password_hash: &str) -> Result<(), StoreError> {
        // Lock order: identities, then sessions.
        let mut identities = self.identities.write().await;
        let mut sessions = self.sessions.write().await;
        sessions.clear();
        identities.clear();
        identities.insert(
            username.to_owned(),
            Identity {
                id: Uuid::now_v7(),
                username: username.to_owned(),
                password_hash: password_hash.to_owned(),
                is_admin: true,
            },
        );
        Ok(())
    }

    async fn insert_session(&self, session: &Session) -> Result<(), StoreError> {
        let now = time::OffsetDateTime::now_utc();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| !s.is_expired(now));
        sessions.insert(session.token_hash.clone(), session.clone());
        Ok(())
    }

    async fn find_session(&self, token_hash: &str) -> Result<Option<Session>, StoreError> {
        let now = time::OffsetDateTime::now_utc();
        Ok(self
            .sessions
            .read()
            .await
            .get(token_hash)
            .filter(|s| !s.is_expired(now))
            .cloned())
    }

    async fn delete_session(&self, token_hash: &str) -> Result<(), StoreError> {
        let now = time::OffsetDateTime::now_utc();
        let mut sessions = self.sessions.write().await;
        sessions.remove(token_hash);
        sessions.retain(|_, s| !s.is_expired(now));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_content_versions_are_append_only() {
        let store = MemoryContentStore::new();
        assert!(store.latest().await.unwrap().is_none());

        let mut doc = ConfigDocument::default();
        assert_eq!(store.append(&doc).await.unwrap(), 1);
        doc.page_content.title = "Second".to_string();
        assert_eq!(store.append(&doc).await.unwrap(), 2);

        let latest = store.latest().await.unwrap().unwrap();
        assert_eq!(latest.version, 2);
        assert_eq!(latest.decode().unwrap().page_content.title, "Second");
        assert_eq!(store.version_count().await, 2);
    }

    #[tokio::test]
    async fn test_insert_purges_expired_sessions() {
        let store = MemoryIdentityStore::new();
        let now = time::OffsetDateTime::now_utc();
        let session = |token_hash: &str, expires_at| Session {
            token_hash: token_hash.to_string(),
            user_id: Uuid::now_v7(),
            username: "root".to_string(),
            is_admin: true,
            created_at: now,
            expires_at,
        };

        store
            .insert_session(&session("old", now - time::Duration::minutes(1)))
            .await
            .unwrap();
        store
            .insert_session(&session("new", now + time::Duration::hours(1)))
            .await
            .unwrap();

        assert_eq!(store.session_count().await, 1);
        assert!(store.find_session("new").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_replace_admin_clears_sessions() {
        let store = MemoryIdentityStore::new();
        store.insert_identity("viewer", "hash", false).await;
        assert!(!store.has_admin().await.unwrap());

        let now = time::OffsetDateTime::now_utc();
        store
            .insert_session(&Session {
                token_hash: "h".to_string(),
                user_id: Uuid::now_v7(),
                username: "viewer".to_string(),
                is_admin: false,
                created_at: now,
                expires_at: now + time::Duration::hours(1),
            })
            .await
            .unwrap();

        store.replace_admin("root", "hash2").await.unwrap();
        assert!(store.has_admin().await.unwrap());
        assert!(store.find_identity("viewer").await.unwrap().is_none());
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_expired_session_not_found() {
        let store = MemoryIdentityStore::new();
        let now = time::OffsetDateTime::now_utc();
        store
            .insert_session(&Session {
                token_hash: "old".to_string(),
                user_id: Uuid::now_v7(),
                username: "root".to_string(),
                is_admin: true,
                created_at: now - time::Duration::hours(2),
                expires_at: now - time::Duration::hours(1),
            })
            .await
            .unwrap();
        assert!(store.find_session("old").await.unwrap().is_none());
    }
}
