//! PartStore implementation for the SQLite catalog

use rusqlite::{params, params_from_iter, ErrorCode, OptionalExtension};
use tracing::{debug, info};

use crate::core::filter::{timestamp_key, CompiledFilter};
use crate::core::identity::PartId;
use crate::entities::part::{ChildPartRef, Part};

use super::sql::{order_and_window, where_clause};
use super::{CatalogStore, FindOptions, PartStore, StoreError};

/// Decode a stored document
fn decode(id: &str, doc: &str) -> Result<Part, StoreError> {
    serde_json::from_str(doc).map_err(|source| StoreError::Corrupt {
        id: id.to_string(),
        source,
    })
}

/// Map a UNIQUE violation on insert to a duplicate part number
fn map_insert_error(err: rusqlite::Error, part: &Part) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            StoreError::DuplicatePartNumber(part.part_number.clone())
        }
        _ => StoreError::Database(err),
    }
}

impl CatalogStore {
    fn read_docs(
        &self,
        sql: &str,
        params: &[rusqlite::types::Value],
    ) -> Result<Vec<Part>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut parts = Vec::new();
        for row in rows {
            let (id, doc) = row?;
            parts.push(decode(&id, &doc)?);
        }
        Ok(parts)
    }

    fn write_doc(&mut self, part: &Part) -> Result<usize, StoreError> {
        let doc = serde_json::to_string(part)?;
        let updated = self.conn.execute(
            "UPDATE parts SET part_number = ?2, part_name = ?3, description = ?4,
                              updated_at = ?5, doc = ?6
             WHERE id = ?1",
            params![
                part.id.to_string(),
                part.part_number,
                part.part_name,
                part.description,
                timestamp_key(&part.updated_at),
                doc
            ],
        );
        updated.map_err(|e| map_insert_error(e, part))
    }
}

impl PartStore for CatalogStore {
    fn count(&self, filter: &CompiledFilter) -> Result<usize, StoreError> {
        let clause = where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM parts WHERE {}", clause.sql);
        let total: i64 = self
            .conn
            .query_row(&sql, params_from_iter(clause.params.iter()), |row| {
                row.get(0)
            })?;
        Ok(total as usize)
    }

    fn find(
        &self,
        filter: &CompiledFilter,
        options: &FindOptions,
    ) -> Result<Vec<Part>, StoreError> {
        let clause = where_clause(filter);
        let sql = format!(
            "SELECT id, doc FROM parts WHERE {}{}",
            clause.sql,
            order_and_window(options)
        );
        debug!(%sql, params = clause.params.len(), "find parts");
        self.read_docs(&sql, &clause.params)
    }

    fn get(&self, id: &PartId) -> Result<Option<Part>, StoreError> {
        let doc: Option<String> = self
            .conn
            .query_row(
                "SELECT doc FROM parts WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        doc.map(|d| decode(&id.to_string(), &d)).transpose()
    }

    fn insert_many(&mut self, parts: &[Part]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO parts (id, part_number, part_name, description, created_at, updated_at, doc)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for part in parts {
                let doc = serde_json::to_string(part)?;
                stmt.execute(params![
                    part.id.to_string(),
                    part.part_number,
                    part.part_name,
                    part.description,
                    timestamp_key(&part.created_at),
                    timestamp_key(&part.updated_at),
                    doc
                ])
                .map_err(|e| map_insert_error(e, part))?;
            }
        }
        tx.commit()?;
        info!(count = parts.len(), "inserted parts");
        Ok(parts.len())
    }

    fn replace_child_parts(
        &mut self,
        id: &PartId,
        children: &[ChildPartRef],
    ) -> Result<Part, StoreError> {
        let mut part = self.get(id)?.ok_or(StoreError::NotFound(*id))?;
        part.replace_child_parts(children.to_vec());
        if self.write_doc(&part)? == 0 {
            return Err(StoreError::NotFound(*id));
        }
        Ok(part)
    }

    fn save(&mut self, part: &Part) -> Result<(), StoreError> {
        if self.write_doc(part)? == 0 {
            self.insert_many(std::slice::from_ref(part))?;
        }
        Ok(())
    }
}
