use async_trait::async_trait;
use sqlx::QueryBuilder;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::{CursorPage, PageRequest};
use crate::application::repos::{
    CreateKnowledgeParams, KnowledgeRepo, RepoError, UpdateKnowledgeParams,
};
use crate::domain::entities::KnowledgeRecord;

use super::{PostgresRepositories, map_sqlx_error};

const KNOWLEDGE_COLUMNS: &str = "id, title, content, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct KnowledgeRow {
    id: Uuid,
    title: String,
    content: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<KnowledgeRow> for KnowledgeRecord {
    fn from(row: KnowledgeRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl KnowledgeRepo for PostgresRepositories {
    async fn list_articles(
        &self,
        page: PageRequest,
    ) -> Result<CursorPage<KnowledgeRecord>, RepoError> {
        let limit = page.limit.clamp(1, 100);

        let mut qb = QueryBuilder::new(format!(
            "SELECT {KNOWLEDGE_COLUMNS} FROM knowledge_articles WHERE 1=1 "
        ));
        if let Some(cursor) = page.cursor {
            qb.push(" AND (created_at, id) < (");
            qb.push_bind(cursor.created_at);
            qb.push(", ");
            qb.push_bind(cursor.id);
            qb.push(")");
        }
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        qb.push_bind(i64::from(limit) + 1);

        let rows: Vec<KnowledgeRow> = qb
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(CursorPage::from_rows(
            rows.into_iter().map(KnowledgeRecord::from).collect(),
            limit,
        ))
    }

    async fn find_article(&self, id: Uuid) -> Result<Option<KnowledgeRecord>, RepoError> {
        let row: Option<KnowledgeRow> = sqlx::query_as(&format!(
            "SELECT {KNOWLEDGE_COLUMNS} FROM knowledge_articles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(KnowledgeRecord::from))
    }

    async fn create_article(
        &self,
        params: CreateKnowledgeParams,
    ) -> Result<KnowledgeRecord, RepoError> {
        let row: KnowledgeRow = sqlx::query_as(&format!(
            "INSERT INTO knowledge_articles (title, content) VALUES ($1, $2) \
             RETURNING {KNOWLEDGE_COLUMNS}"
        ))
        .bind(params.title)
        .bind(params.content)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(KnowledgeRecord::from(row))
    }

    async fn update_article(
        &self,
        id: Uuid,
        params: UpdateKnowledgeParams,
    ) -> Result<Option<KnowledgeRecord>, RepoError> {
        let row: Option<KnowledgeRow> = sqlx::query_as(&format!(
            "UPDATE knowledge_articles SET \
                 title = COALESCE($1, title), \
                 content = COALESCE($2, content), \
                 updated_at = now() \
             WHERE id = $3 RETURNING {KNOWLEDGE_COLUMNS}"
        ))
        .bind(params.title)
        .bind(params.content)
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(KnowledgeRecord::from))
    }

    async fn delete_article(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM knowledge_articles WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
