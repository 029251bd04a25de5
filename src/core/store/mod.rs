//! SQLite-backed part store
//!
//! Parts are kept as JSON documents with their scalar search keys
//! (`part_number`, `part_name`, `description`, `created_at`) copied into
//! indexed columns. Tag sets and child references stay inside the document
//! and are queried with `json_each`.
//!
//! The [`PartStore`] trait is the seam the listing, reconciliation, and
//! generation code works against; [`CatalogStore`] is the SQLite backend.

mod queries;
mod schema;
mod sql;
mod types;

pub use types::*;

use std::path::Path;
use std::sync::Arc;

use regex::Regex;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Error as SqlError};
use tracing::debug;

use crate::core::filter::CompiledFilter;
use crate::core::identity::PartId;
use crate::core::reconcile::CanonicalEntry;
use crate::entities::part::{ChildPartRef, Part};

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Document store operations the catalog relies on
pub trait PartStore {
    /// Count parts matching the filter
    fn count(&self, filter: &CompiledFilter) -> Result<usize, StoreError>;

    /// Find parts matching the filter, sorted and windowed
    fn find(&self, filter: &CompiledFilter, options: &FindOptions)
        -> Result<Vec<Part>, StoreError>;

    /// Fetch one part by id
    fn get(&self, id: &PartId) -> Result<Option<Part>, StoreError>;

    /// Insert a batch of new parts; all or nothing
    fn insert_many(&mut self, parts: &[Part]) -> Result<usize, StoreError>;

    /// Replace a part's whole child list in one atomic update
    fn replace_child_parts(
        &mut self,
        id: &PartId,
        children: &[ChildPartRef],
    ) -> Result<Part, StoreError>;

    /// Insert or overwrite a full part document
    fn save(&mut self, part: &Part) -> Result<(), StoreError>;

    /// First part matching the filter, newest first
    fn find_one(&self, filter: &CompiledFilter) -> Result<Option<Part>, StoreError> {
        Ok(self
            .find(filter, &FindOptions::newest_first().limit(1))?
            .into_iter()
            .next())
    }

    /// Canonical pool of the newest parts, optionally capped
    fn canonical_pool(&self, limit: Option<usize>) -> Result<Vec<CanonicalEntry>, StoreError> {
        let mut options = FindOptions::newest_first();
        options.limit = limit;
        Ok(self
            .find(&CompiledFilter::None, &options)?
            .iter()
            .map(CanonicalEntry::from)
            .collect())
    }
}

/// The part store backed by SQLite
pub struct CatalogStore {
    conn: Connection,
}

impl CatalogStore {
    /// Open or create a catalog database file
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::Open {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        debug!(path = %path.display(), "opened catalog database");
        Self::from_connection(conn)
    }

    /// Open a private in-memory catalog
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        register_regexp(&conn)?;
        let mut store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }
}

/// Register `regexp(pattern, text)` so `text REGEXP pattern` works
///
/// Non-text values (NULL, numbers) never match.
fn register_regexp(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "regexp",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let re: Arc<Regex> = ctx.get_or_create_aux(0, |vr| -> Result<_, BoxError> {
                Ok(Regex::new(vr.as_str()?)?)
            })?;
            let is_match = match ctx.get_raw(1) {
                ValueRef::Text(bytes) => std::str::from_utf8(bytes)
                    .map(|text| re.is_match(text))
                    .map_err(|e| SqlError::UserFunctionError(e.into()))?,
                _ => false,
            };
            Ok(is_match)
        },
    )
}

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[cfg(test)]
mod tests;
