//! Shared cursor pagination helpers.
//!
//! Every paginated resource sorts by `(created_at DESC, id DESC)` and pages
//! with a compound cursor holding the sort key of the last returned row.
//! The storage-identity tie-break is what keeps page walks complete and
//! duplicate-free when several rows share a timestamp.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

/// Position after the last item of the previous page.
///
/// Travels on the wire as two query parameters (`cursor` RFC 3339 timestamp
/// and `id` UUID) and is folded into cache keys at full precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor {
    pub created_at: OffsetDateTime,
    pub id: Uuid,
}

impl Cursor {
    pub fn new(created_at: OffsetDateTime, id: Uuid) -> Self {
        Self { created_at, id }
    }

    /// Build a cursor from the raw query parameters.
    ///
    /// Both parameters must be present to constrain the page; a lone
    /// `cursor` or `id` is ignored and yields the first page, matching the
    /// behavior of the wire protocol this replaces.
    pub fn from_params(
        cursor: Option<&str>,
        id: Option<Uuid>,
    ) -> Result<Option<Self>, PaginationError> {
        match (cursor, id) {
            (Some(raw), Some(id)) => {
                let created_at = OffsetDateTime::parse(raw, &Rfc3339)
                    .map_err(|err| PaginationError::InvalidCursor(err.to_string()))?;
                Ok(Some(Self { created_at, id }))
            }
            _ => Ok(None),
        }
    }

    /// Deterministic rendering used inside cache keys.
    ///
    /// Full nanosecond precision: truncating would let two cursor positions
    /// inside the same instant share a key while paging different rows. The
    /// UUID disambiguates equal timestamps.
    pub fn key_segment(&self) -> String {
        let nanos = self.created_at.unix_timestamp_nanos();
        format!("{nanos}:{}", self.id)
    }
}

/// Cursor-aware pagination request.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub limit: u32,
    pub cursor: Option<Cursor>,
}

impl PageRequest {
    pub fn new(limit: u32, cursor: Option<Cursor>) -> Self {
        Self { limit, cursor }
    }

    pub fn first(limit: u32) -> Self {
        Self {
            limit,
            cursor: None,
        }
    }
}

/// Sort-key access for rows that participate in cursor pagination.
pub trait CursorKeyed {
    fn sort_time(&self) -> OffsetDateTime;
    fn sort_id(&self) -> Uuid;
}

impl CursorKeyed for crate::domain::entities::PostRecord {
    fn sort_time(&self) -> OffsetDateTime {
        self.created_at
    }

    fn sort_id(&self) -> Uuid {
        self.id
    }
}

impl CursorKeyed for crate::domain::entities::CommentRecord {
    fn sort_time(&self) -> OffsetDateTime {
        self.created_at
    }

    fn sort_id(&self) -> Uuid {
        self.id
    }
}

impl CursorKeyed for crate::domain::entities::KnowledgeRecord {
    fn sort_time(&self) -> OffsetDateTime {
        self.created_at
    }

    fn sort_id(&self) -> Uuid {
        self.id
    }
}

/// One page of results plus the handoff to the next page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorPage<T> {
    pub data: Vec<T>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub next_cursor: Option<OffsetDateTime>,
    pub next_id: Option<Uuid>,
    pub has_more: bool,
}

impl<T> CursorPage<T> {
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            next_cursor: None,
            next_id: None,
            has_more: false,
        }
    }

    /// Trim an over-fetched row set down to one page.
    ///
    /// `rows` must have been fetched with `limit + 1` under the canonical
    /// sort. A full `limit + 1` rows means another page exists; the extra
    /// row is discarded and the cursor handoff is taken from the last row
    /// actually returned. Anything shorter is the final page and carries no
    /// cursor.
    pub fn from_rows(mut rows: Vec<T>, limit: u32) -> Self
    where
        T: CursorKeyed,
    {
        let has_more = rows.len() as u64 > u64::from(limit);
        if has_more {
            rows.pop();
        }

        let (next_cursor, next_id) = if has_more {
            match rows.last() {
                Some(last) => (Some(last.sort_time()), Some(last.sort_id())),
                None => (None, None),
            }
        } else {
            (None, None)
        };

        Self {
            data: rows,
            next_cursor,
            next_id,
            has_more,
        }
    }
}

#[derive(Debug, Error)]
pub enum PaginationError {
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),
}
