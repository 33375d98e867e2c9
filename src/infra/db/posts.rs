use async_trait::async_trait;
use sqlx::QueryBuilder;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::{CursorPage, PageRequest};
use crate::application::repos::{
    CreatePostParams, PostQueryFilter, PostsRepo, RepoError, UpdatePostParams,
};
use crate::domain::entities::{CategoryDigest, DashboardStats, PostRecord};

use super::{PostgresRepositories, escape_like, map_sqlx_error};

const POST_COLUMNS: &str = "id, public_id, title, content, caption, category, tag, image, trivia, \
     comment_count, views, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    public_id: i64,
    title: String,
    content: String,
    caption: String,
    category: String,
    tag: String,
    image: String,
    trivia: String,
    comment_count: i64,
    views: i64,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            public_id: row.public_id,
            title: row.title,
            content: row.content,
            caption: row.caption,
            category: row.category,
            tag: row.tag,
            image: row.image,
            trivia: row.trivia,
            comment_count: row.comment_count,
            views: row.views,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn push_cursor_predicate(qb: &mut QueryBuilder<'_, sqlx::Postgres>, page: &PageRequest) {
    if let Some(cursor) = page.cursor {
        qb.push(" AND (created_at, id) < (");
        qb.push_bind(cursor.created_at);
        qb.push(", ");
        qb.push_bind(cursor.id);
        qb.push(")");
    }
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn list_posts(
        &self,
        filter: &PostQueryFilter,
        page: PageRequest,
    ) -> Result<CursorPage<PostRecord>, RepoError> {
        let limit = page.limit.clamp(1, 100);

        let mut qb = QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM posts WHERE 1=1 "));
        if let Some(category) = &filter.category {
            qb.push(" AND lower(category) = ");
            qb.push_bind(category.to_lowercase());
        }
        push_cursor_predicate(&mut qb, &page);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        qb.push_bind(i64::from(limit) + 1);

        let rows: Vec<PostRow> = qb
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(CursorPage::from_rows(
            rows.into_iter().map(PostRecord::from).collect(),
            limit,
        ))
    }

    async fn search_posts(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<CursorPage<PostRecord>, RepoError> {
        let limit = page.limit.clamp(1, 100);
        let pattern = format!("%{}%", escape_like(term));

        let mut qb = QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM posts WHERE ("));
        let mut separated = false;
        for column in ["title", "content", "caption", "tag", "category"] {
            if separated {
                qb.push(" OR ");
            }
            qb.push(column);
            qb.push(" ILIKE ");
            qb.push_bind(pattern.clone());
            separated = true;
        }
        qb.push(")");
        push_cursor_predicate(&mut qb, &page);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        qb.push_bind(i64::from(limit) + 1);

        let rows: Vec<PostRow> = qb
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(CursorPage::from_rows(
            rows.into_iter().map(PostRecord::from).collect(),
            limit,
        ))
    }

    async fn find_by_public_id(&self, public_id: i64) -> Result<Option<PostRecord>, RepoError> {
        let row: Option<PostRow> = sqlx::query_as(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE public_id = $1"
        ))
        .bind(public_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }

    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let row: PostRow = sqlx::query_as(&format!(
            "INSERT INTO posts (public_id, title, content, caption, category, tag, image, trivia) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {POST_COLUMNS}"
        ))
        .bind(params.public_id)
        .bind(params.title)
        .bind(params.content)
        .bind(params.caption)
        .bind(params.category)
        .bind(params.tag)
        .bind(params.image)
        .bind(params.trivia)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(PostRecord::from(row))
    }

    async fn update_post(
        &self,
        public_id: i64,
        params: UpdatePostParams,
    ) -> Result<Option<PostRecord>, RepoError> {
        let row: Option<PostRow> = sqlx::query_as(&format!(
            "UPDATE posts SET \
                 title = COALESCE($1, title), \
                 content = COALESCE($2, content), \
                 caption = COALESCE($3, caption), \
                 category = COALESCE($4, category), \
                 tag = COALESCE($5, tag), \
                 image = COALESCE($6, image), \
                 trivia = COALESCE($7, trivia), \
                 updated_at = now() \
             WHERE public_id = $8 RETURNING {POST_COLUMNS}"
        ))
        .bind(params.title)
        .bind(params.content)
        .bind(params.caption)
        .bind(params.category)
        .bind(params.tag)
        .bind(params.image)
        .bind(params.trivia)
        .bind(public_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }

    async fn delete_post(&self, public_id: i64) -> Result<Option<PostRecord>, RepoError> {
        let row: Option<PostRow> = sqlx::query_as(&format!(
            "DELETE FROM posts WHERE public_id = $1 RETURNING {POST_COLUMNS}"
        ))
        .bind(public_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }

    async fn increment_views(&self, public_id: i64) -> Result<bool, RepoError> {
        let result =
            sqlx::query("UPDATE posts SET views = views + 1, updated_at = now() WHERE public_id = $1")
                .bind(public_id)
                .execute(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn adjust_comment_count(&self, public_id: i64, delta: i64) -> Result<bool, RepoError> {
        let result = sqlx::query(
            "UPDATE posts SET comment_count = comment_count + $1, updated_at = now() \
             WHERE public_id = $2",
        )
        .bind(delta)
        .bind(public_id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, RepoError> {
        let (total_posts, total_views, total_comments): (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(views), 0)::BIGINT, \
             COALESCE(SUM(comment_count), 0)::BIGINT FROM posts",
        )
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(DashboardStats {
            total_posts,
            total_views,
            total_comments,
        })
    }

    async fn home_digest(&self, per_category: u32) -> Result<Vec<CategoryDigest>, RepoError> {
        let rows: Vec<PostRow> = sqlx::query_as(&format!(
            "SELECT {POST_COLUMNS} FROM ( \
                 SELECT *, row_number() OVER ( \
                     PARTITION BY lower(category) \
                     ORDER BY created_at DESC, id DESC \
                 ) AS category_rank FROM posts \
             ) ranked WHERE category_rank <= $1 \
             ORDER BY lower(category) ASC, created_at DESC, id DESC"
        ))
        .bind(i64::from(per_category.max(1)))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let mut digest: Vec<CategoryDigest> = Vec::new();
        for row in rows {
            let post = PostRecord::from(row);
            match digest
                .last_mut()
                .filter(|entry| entry.category.eq_ignore_ascii_case(&post.category))
            {
                Some(entry) => entry.posts.push(post),
                None => digest.push(CategoryDigest {
                    category: post.category.clone(),
                    posts: vec![post],
                }),
            }
        }
        Ok(digest)
    }
}
