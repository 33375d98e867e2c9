//! Domain entities mirrored from persistent storage.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A blog post.
///
/// `public_id` is the externally visible identifier, derived from the
/// creation time in milliseconds; `id` is the storage identity used as the
/// pagination tie-break. `comment_count` and `views` are denormalized
/// counters maintained with atomic store-side increments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub id: Uuid,
    pub public_id: i64,
    pub title: String,
    pub content: String,
    pub caption: String,
    pub category: String,
    pub tag: String,
    pub image: String,
    pub trivia: String,
    pub comment_count: i64,
    pub views: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A comment attached to a post by its public id.
///
/// `post_id` references `PostRecord::public_id`, not the storage identity;
/// deleting a post leaves its comments in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    pub id: Uuid,
    pub post_id: i64,
    pub name: String,
    pub comment: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A post category. Posts reference categories by name string only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A knowledge-base article with rich-text HTML content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeRecord {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Aggregate counters for the dashboard view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_posts: i64,
    pub total_views: i64,
    pub total_comments: i64,
}

/// The latest posts for one category on the home digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDigest {
    pub category: String,
    pub posts: Vec<PostRecord>,
}

/// Per-category digest of recent posts served on the home view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeDigest {
    pub categories: Vec<CategoryDigest>,
}
