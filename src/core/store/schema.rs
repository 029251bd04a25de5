//! Database schema initialization

use rusqlite::{params, OptionalExtension};

use super::{CatalogStore, StoreError, SCHEMA_VERSION};

impl CatalogStore {
    /// Create tables on first open and check the version on later opens
    pub(super) fn init_schema(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- One row per part; doc holds the full JSON document
            CREATE TABLE IF NOT EXISTS parts (
                id TEXT PRIMARY KEY,
                part_number TEXT NOT NULL UNIQUE,
                part_name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                doc TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_parts_created ON parts(created_at DESC, id DESC);
            CREATE INDEX IF NOT EXISTS idx_parts_name ON parts(part_name);
            "#,
        )?;

        let found: Option<i32> = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        match found {
            None => {
                self.conn.execute(
                    "INSERT INTO schema_version (version) VALUES (?1)",
                    params![SCHEMA_VERSION],
                )?;
                Ok(())
            }
            Some(v) if v == SCHEMA_VERSION => Ok(()),
            Some(v) => Err(StoreError::SchemaVersion {
                found: v,
                expected: SCHEMA_VERSION,
            }),
        }
    }
}
