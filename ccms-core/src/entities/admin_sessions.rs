use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AdminSessionRecord {
    pub token_hash: String,
    pub user_id: Uuid,
    pub username: String,
    pub is_admin: bool,
    pub created_at: time::OffsetDateTime,
    pub expires_at: time::OffsetDateTime,
}

#[derive(Debug, Clone)]
/// Insert a session, purging expired ones in the same transaction.
pub struct InsertAdminSession {
    pub record: AdminSessionRecord,
}

impl Processor<InsertAdminSession> for DatabaseProcessor {
    type Output = ();
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertAdminSession")]
    async fn process(&self, insert: InsertAdminSession) -> Result<(), sqlx::Error> {
        let r = insert.record;
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM admin_sessions WHERE expires_at <= now()")
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO admin_sessions (token_hash, user_id, username, is_admin, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(r.token_hash)
        .bind(r.user_id)
        .bind(r.username)
        .bind(r.is_admin)
        .bind(r.created_at)
        .bind(r.expires_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// Get an unexpired session by the digest of its token.
pub struct GetAdminSession {
    pub token_hash: String,
}

impl Processor<GetAdminSession> for DatabaseProcessor {
    type Output = Option<AdminSessionRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetAdminSession")]
    async fn process(
        &self,
        query: GetAdminSession,
    ) -> Result<Option<AdminSessionRecord>, sqlx::Error> {
        let record = sqlx::query_as::<_, AdminSessionRecord>(
            r#"
            SELECT token_hash, user_id, username, is_admin, created_at, expires_at
            FROM admin_sessions
            WHERE token_hash = $1 AND expires_at > now()
            "#,
        )
        .bind(query.token_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }
}

#[derive(Debug, Clone)]
/// Delete a session. Deleting a missing session is not an error.
pub struct DeleteAdminSession {
    pub token_hash: String,
}

impl Processor<DeleteAdminSession> for DatabaseProcessor {
    type Output = ();
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:DeleteAdminSession")]
    async fn process(&self, delete: DeleteAdminSession) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM admin_sessions WHERE token_hash = $1 OR expires_at <= now()")
            .bind(delete.token_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
