//! Cache key definitions.
//!
//! Every cacheable read maps to exactly one `CacheKey`; the rendering is a
//! pure function of the request parameters, so two requests share a key iff
//! they would produce identical result sets from an unchanged store. List
//! keys always include the page limit — a limit=5 request must never be
//! answered from a cached limit=20 page.

use std::fmt;

use uuid::Uuid;

use crate::application::pagination::{Cursor, PageRequest};

/// Sentinel rendered for an absent cursor (first page).
const FIRST: &str = "first:first";

/// Marker value a client sends to list every category.
const ALL_CATEGORIES: &str = "all";

fn cursor_segment(cursor: Option<&Cursor>) -> String {
    cursor.map_or_else(|| FIRST.to_string(), Cursor::key_segment)
}

/// Normalize an optional category filter: lowercased, with the `All`
/// sentinel and blank values meaning "no filter".
pub fn normalize_category(category: Option<&str>) -> Option<String> {
    let value = category?.trim().to_lowercase();
    if value.is_empty() || value == ALL_CATEGORIES {
        None
    } else {
        Some(value)
    }
}

/// A fully qualified cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Single post by its public id.
    Post { public_id: i64 },
    /// One page of the post list, optionally filtered by category.
    PostList {
        category: Option<String>,
        cursor: Option<Cursor>,
        limit: u32,
    },
    /// Per-category home digest. Parameterless: size comes from config.
    HomeDigest,
    /// One page of search results.
    Search {
        term: String,
        cursor: Option<Cursor>,
        limit: u32,
    },
    /// One page of a post's comments.
    Comments {
        post_public_id: i64,
        cursor: Option<Cursor>,
        limit: u32,
    },
    /// The full category list.
    Categories,
    /// Single category by storage id.
    Category { id: Uuid },
    /// One page of the knowledge article list.
    KnowledgeList { cursor: Option<Cursor>, limit: u32 },
    /// Single knowledge article by storage id.
    Knowledge { id: Uuid },
    /// Aggregate dashboard counters.
    DashboardStats,
}

impl CacheKey {
    pub fn post(public_id: i64) -> Self {
        Self::Post { public_id }
    }

    pub fn post_list(category: Option<&str>, page: &PageRequest) -> Self {
        Self::PostList {
            category: normalize_category(category),
            cursor: page.cursor,
            limit: page.limit,
        }
    }

    pub fn search(term: &str, page: &PageRequest) -> Self {
        Self::Search {
            term: term.trim().to_lowercase(),
            cursor: page.cursor,
            limit: page.limit,
        }
    }

    pub fn comments(post_public_id: i64, page: &PageRequest) -> Self {
        Self::Comments {
            post_public_id,
            cursor: page.cursor,
            limit: page.limit,
        }
    }

    pub fn knowledge_list(page: &PageRequest) -> Self {
        Self::KnowledgeList {
            cursor: page.cursor,
            limit: page.limit,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Post { public_id } => write!(f, "post:{public_id}"),
            Self::PostList {
                category,
                cursor,
                limit,
            } => {
                let category = category.as_deref().unwrap_or(ALL_CATEGORIES);
                write!(
                    f,
                    "posts:list:{category}:{}:{limit}",
                    cursor_segment(cursor.as_ref())
                )
            }
            Self::HomeDigest => write!(f, "posts:home"),
            Self::Search {
                term,
                cursor,
                limit,
            } => write!(
                f,
                "search:{term}:{}:{limit}",
                cursor_segment(cursor.as_ref())
            ),
            Self::Comments {
                post_public_id,
                cursor,
                limit,
            } => write!(
                f,
                "comments:{post_public_id}:{}:{limit}",
                cursor_segment(cursor.as_ref())
            ),
            Self::Categories => write!(f, "categories"),
            Self::Category { id } => write!(f, "categories:{id}"),
            Self::KnowledgeList { cursor, limit } => write!(
                f,
                "knowledge:list:{}:{limit}",
                cursor_segment(cursor.as_ref())
            ),
            Self::Knowledge { id } => write!(f, "knowledge:{id}"),
            Self::DashboardStats => write!(f, "stats:dashboard"),
        }
    }
}

/// A key-space prefix purged in bulk when exact keys are unenumerable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPrefix {
    /// Every post list page plus the home digest.
    Posts,
    /// Every cached search page.
    Search,
    /// Every cached comment page for one post.
    Comments { post_public_id: i64 },
    /// Every knowledge list page and singleton.
    Knowledge,
}

impl fmt::Display for KeyPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Posts => write!(f, "posts"),
            Self::Search => write!(f, "search"),
            Self::Comments { post_public_id } => write!(f, "comments:{post_public_id}"),
            Self::Knowledge => write!(f, "knowledge"),
        }
    }
}

impl KeyPrefix {
    /// Glob pattern matching every key under this prefix.
    pub fn pattern(&self) -> String {
        format!("{self}:*")
    }

    /// Whether a rendered key falls under this prefix.
    pub fn covers(&self, key: &str) -> bool {
        let prefix = self.to_string();
        key.len() > prefix.len() + 1
            && key.starts_with(&prefix)
            && key.as_bytes()[prefix.len()] == b':'
    }
}
