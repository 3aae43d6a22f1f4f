//! PostgreSQL-backed stores.

use async_trait::async_trait;
use ccms_sdk::objects::ConfigDocument;
use kanau::processor::Processor;
use sqlx::PgPool;

use super::{
    ContentStore, DocumentColumns, Identity, IdentityStore, Session, StoreError, StoredDocument,
};
use crate::entities::admin_sessions::{
    AdminSessionRecord, DeleteAdminSession, GetAdminSession, InsertAdminSession,
};
use crate::entities::admin_users::{GetAdminUserByUsername, HasAdminUser, ReplaceAdminUser};
use crate::entities::cms_documents::{GetLatestCmsDocument, InsertCmsDocument};
use crate::framework::DatabaseProcessor;

/// Document versions in the `cms_documents` table.
#[derive(Clone)]
pub struct PgContentStore {
    processor: DatabaseProcessor,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            processor: DatabaseProcessor { pool },
        }
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn latest(&self) -> Result<Option<StoredDocument>, StoreError> {
        let record = self.processor.process(GetLatestCmsDocument).await?;
        Ok(record.map(|r| StoredDocument {
            version: r.id,
            page_content: r.page_content,
            page_style: r.page_style,
            payment_gateways: r.payment_gateways,
            active_gateway_id: r.active_gateway_id,
        }))
    }

    async fn append(&self, document: &ConfigDocument) -> Result<i64, StoreError> {
        let cols = DocumentColumns::encode(document)?;
        let id = self
            .processor
            .process(InsertCmsDocument {
                page_content: cols.page_content,
                page_style: cols.page_style,
                payment_gateways: cols.payment_gateways,
                active_gateway_id: cols.active_gateway_id,
            })
            .await?;
        Ok(id)
    }
}

/// Identities in `admin_users`, sessions in `admin_sessions`.
#[derive(Clone)]
pub struct PgIdentityStore {
    processor: DatabaseProcessor,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            processor: DatabaseProcessor { pool },
        }
    }
}

impl From<AdminSessionRecord> for Session {
    fn from(r: AdminSessionRecord) -> Self {
        Session {
            token_hash: r.token_hash,
            user_id: r.user_id,
            username: r.username,
            is_admin: r.is_admin,
            created_at: r.created_at,
            expires_at: r.expires_at,
        }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_identity(&self, username: &str) -> Result<Option<Identity>, StoreError> {
        let record = self
            .processor
            .process(GetAdminUserByUsername {
                username: username.to_owned(),
            })
            .await?;
        Ok(record.map(|r| Identity {
            id: r.id,
            username: r.username,
            password_hash: r.password_hash,
            is_admin: r.is_admin,
        }))
    }

    async fn has_admin(&self) -> Result<bool, StoreError> {
        Ok(self.processor.process(HasAdminUser).await?)
    }

    async fn replace_admin(&self, username: &str, password_hash: &str) -> Result<(), StoreError> {
        self.processor
            .process(ReplaceAdminUser {
                username: username.to_owned(),
                password_hash: password_hash.to_owned(),
            })
            .await?;
        Ok(())
    }

    async fn insert_session(&self, session: &Session) -> Result<(), StoreError> {
        self.processor
            .process(InsertAdminSession {
                record: AdminSessionRecord {
                    token_hash: session.token_hash.clone(),
                    user_id: session.user_id,
                    username: session.username.clone(),
                    is_admin: session.is_admin,
                    created_at: session.created_at,
                    expires_at: session.expires_at,
                },
            })
            .await?;
        Ok(())
    }

    async fn find_session(&self, token_hash: &str) -> Result<Option<Session>, StoreError> {
        let record = self
            .processor
            .process(GetAdminSession {
                token_hash: token_hash.to_owned(),
            })
            .await?;
        Ok(record.map(Session::from))
    }

    async fn delete_session(&self, token_hash: &str) -> Result<(), StoreError> {
        self.processor
            .process(DeleteAdminSession {
                token_hash: token_hash.to_owned(),
            })
            .await?;
        Ok(())
    }
}
