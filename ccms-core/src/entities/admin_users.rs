use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use uuid::Uuid;

#[derive(Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AdminUserRecord {
    pub id: Uuid,
    pub created_at: time::OffsetDateTime,
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
}

impl std::fmt::Debug for AdminUserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminUserRecord")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("username", &self.username)
            .field("is_admin", &self.is_admin)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
/// Look up an identity by its unique username.
pub struct GetAdminUserByUsername {
    pub username: String,
}

impl Processor<GetAdminUserByUsername> for DatabaseProcessor {
    type Output = Option<AdminUserRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetAdminUserByUsername")]
    async fn process(
        &self,
        query: GetAdminUserByUsername,
    ) -> Result<Option<AdminUserRecord>, sqlx::Error> {
        let record = sqlx::query_as::<_, AdminUserRecord>(
            r#"
            SELECT id, created_at, username, password_hash, is_admin
            FROM admin_users
            WHERE username = $1
            "#,
        )
        .bind(query.username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }
}

#[derive(Debug, Clone)]
/// Whether any identity carries the admin privilege.
pub struct HasAdminUser;

impl Processor<HasAdminUser> for DatabaseProcessor {
    type Output = bool;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:HasAdminUser")]
    async fn process(&self, _query: HasAdminUser) -> Result<bool, sqlx::Error> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM admin_users WHERE is_admin)")
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

#[derive(Clone)]
/// Replace every identity with a single admin identity.
///
/// Runs in one transaction: all sessions and identities are deleted, then
/// the new admin is inserted.
pub struct ReplaceAdminUser {
    pub username: String,
    pub password_hash: String,
}

impl std::fmt::Debug for ReplaceAdminUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplaceAdminUser")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Processor<ReplaceAdminUser> for DatabaseProcessor {
    type Output = Uuid;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ReplaceAdminUser")]
    async fn process(&self, replace: ReplaceAdminUser) -> Result<Uuid, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM admin_sessions")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM admin_users")
            .execute(&mut *tx)
            .await?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO admin_users (id, username, password_hash, is_admin)
            VALUES ($1, $2, $3, TRUE)
            RETURNING id
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(replace.username)
        .bind(replace.password_hash)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id)
    }
}
