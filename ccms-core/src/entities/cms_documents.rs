use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;

/// One stored version of the configuration document.
///
/// Section columns are nullable jsonb: a version written by another tool may
/// be missing sections, which the merge service treats as incomplete.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CmsDocumentRecord {
    pub id: i64,
    pub created_at: time::OffsetDateTime,
    pub page_content: Option<serde_json::Value>,
    pub page_style: Option<serde_json::Value>,
    pub payment_gateways: Option<serde_json::Value>,
    pub active_gateway_id: Option<String>,
}

#[derive(Debug, Clone)]
/// Get the newest document version.
pub struct GetLatestCmsDocument;

impl Processor<GetLatestCmsDocument> for DatabaseProcessor {
    type Output = Option<CmsDocumentRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetLatestCmsDocument")]
    async fn process(
        &self,
        _query: GetLatestCmsDocument,
    ) -> Result<Option<CmsDocumentRecord>, sqlx::Error> {
        let record = sqlx::query_as::<_, CmsDocumentRecord>(
            r#"
            SELECT id, created_at, page_content, page_style, payment_gateways, active_gateway_id
            FROM cms_documents
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }
}

#[derive(Debug, Clone)]
/// Append a new document version. Returns the new version id.
pub struct InsertCmsDocument {
    pub page_content: serde_json::Value,
    pub page_style: serde_json::Value,
    pub payment_gateways: serde_json::Value,
    pub active_gateway_id: Option<String>,
}

impl Processor<InsertCmsDocument> for DatabaseProcessor {
    type Output = i64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertCmsDocument")]
    async fn process(&self, insert: InsertCmsDocument) -> Result<i64, sqlx::Error> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO cms_documents (page_content, page_style, payment_gateways, active_gateway_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(insert.page_content)
        .bind(insert.page_style)
        .bind(insert.payment_gateways)
        .bind(insert.active_gateway_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }
}
