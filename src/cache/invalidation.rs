//! Invalidation policy: which cache entries each mutation makes stale.
//!
//! The scope of a purge is the smallest prefix set covering every key whose
//! underlying query result changed. Purging too much costs a few extra
//! store reads; purging too little leaves stale data reachable, so every
//! plan here errs wide.

use uuid::Uuid;

use super::keys::{CacheKey, KeyPrefix};
use super::service::CacheService;

/// A store mutation that may invalidate cached reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationEvent {
    /// Post created, updated, or deleted.
    PostWritten { public_id: i64 },
    /// Post view counter incremented. List views exclude view counts, so
    /// only the singleton goes stale.
    PostViewed { public_id: i64 },
    /// Comment created or deleted under a post. The post singleton carries
    /// the embedded comment counter.
    CommentWritten { post_public_id: i64 },
    /// Category created, updated, or deleted.
    CategoryWritten { id: Uuid },
    /// Knowledge article created, updated, or deleted.
    KnowledgeWritten,
}

/// The exact keys and prefixes a mutation purges.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PurgePlan {
    pub prefixes: Vec<KeyPrefix>,
    pub keys: Vec<CacheKey>,
}

impl MutationEvent {
    pub fn purge_plan(&self) -> PurgePlan {
        match *self {
            Self::PostWritten { public_id } => PurgePlan {
                // `posts:*` covers every list page and the home digest;
                // search pages and the dashboard embed post state too.
                prefixes: vec![KeyPrefix::Posts, KeyPrefix::Search],
                keys: vec![CacheKey::post(public_id), CacheKey::DashboardStats],
            },
            Self::PostViewed { public_id } => PurgePlan {
                prefixes: Vec::new(),
                keys: vec![CacheKey::post(public_id)],
            },
            Self::CommentWritten { post_public_id } => PurgePlan {
                prefixes: vec![KeyPrefix::Comments { post_public_id }],
                keys: vec![CacheKey::post(post_public_id), CacheKey::DashboardStats],
            },
            Self::CategoryWritten { id } => PurgePlan {
                prefixes: Vec::new(),
                keys: vec![CacheKey::Categories, CacheKey::Category { id }],
            },
            Self::KnowledgeWritten => PurgePlan {
                prefixes: vec![KeyPrefix::Knowledge],
                keys: Vec::new(),
            },
        }
    }
}

/// Applies purge plans after successful mutations.
#[derive(Clone)]
pub struct Invalidator {
    cache: CacheService,
}

impl Invalidator {
    pub fn new(cache: CacheService) -> Self {
        Self { cache }
    }

    pub async fn apply(&self, event: MutationEvent) {
        let plan = event.purge_plan();
        let mut removed = 0;
        for prefix in &plan.prefixes {
            removed += self.cache.purge_prefix(prefix).await;
        }
        for key in &plan.keys {
            if self.cache.delete(key).await {
                removed += 1;
            }
        }
        tracing::debug!(event = ?event, removed, "cache invalidated");
    }

    pub async fn post_written(&self, public_id: i64) {
        self.apply(MutationEvent::PostWritten { public_id }).await;
    }

    pub async fn post_viewed(&self, public_id: i64) {
        self.apply(MutationEvent::PostViewed { public_id }).await;
    }

    pub async fn comment_written(&self, post_public_id: i64) {
        self.apply(MutationEvent::CommentWritten { post_public_id })
            .await;
    }

    pub async fn category_written(&self, id: Uuid) {
        self.apply(MutationEvent::CategoryWritten { id }).await;
    }

    pub async fn knowledge_written(&self) {
        self.apply(MutationEvent::KnowledgeWritten).await;
    }
}
