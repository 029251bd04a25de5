//! Store type definitions
//!
//! Query options and errors shared by every [`super::PartStore`] backend.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::identity::PartId;

/// Sortable columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    CreatedAt,
    Id,
    PartNumber,
}

impl SortKey {
    pub(super) fn column(&self) -> &'static str {
        match self {
            SortKey::CreatedAt => "created_at",
            SortKey::Id => "id",
            SortKey::PartNumber => "part_number",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub(super) fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// One key of a multi-key sort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn desc(key: SortKey) -> Self {
        Self {
            key,
            order: SortOrder::Desc,
        }
    }

    pub fn asc(key: SortKey) -> Self {
        Self {
            key,
            order: SortOrder::Asc,
        }
    }
}

/// Sort and window for a find
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindOptions {
    pub sort: Vec<SortSpec>,
    pub skip: usize,
    pub limit: Option<usize>,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self::newest_first()
    }
}

impl FindOptions {
    /// `createdAt` descending with `id` descending as tie-break
    ///
    /// Records sharing a creation timestamp would otherwise come back in an
    /// unspecified order and pages would overlap.
    pub fn newest_first() -> Self {
        Self {
            sort: vec![SortSpec::desc(SortKey::CreatedAt), SortSpec::desc(SortKey::Id)],
            skip: 0,
            limit: None,
        }
    }

    pub fn window(mut self, skip: usize, limit: usize) -> Self {
        self.skip = skip;
        self.limit = Some(limit);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Errors raised by the part store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("cannot encode part document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("stored document for {id} is corrupt: {source}")]
    Corrupt {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("part number '{0}' already exists")]
    DuplicatePartNumber(String),

    #[error("part {0} not found")]
    NotFound(PartId),

    #[error("catalog schema version {found} is not supported (expected {expected})")]
    SchemaVersion { found: i32, expected: i32 },

    #[error("cannot open catalog at {path}: {message}")]
    Open { path: PathBuf, message: String },
}
