//! SQLite table of passage records
//!
//! Ids are handed out 1, 2, 3, … in insertion order. A rebuild drops the
//! previous table; there is no incremental update path.

use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{Chunk, ChunkFields};

/// Column layout recorded in the manifest
pub const CHUNK_COLUMNS: &[&str] = &["id", "source", "section_title", "anchor", "text"];

struct StoreInner {
    conn: Connection,
    next_id: i64,
}

/// Durable table of chunk records keyed by sequential id
pub struct MetadataStore {
    inner: Mutex<StoreInner>,
}

impl MetadataStore {
    /// Open the database at `path`, discarding any previous chunk table
    pub fn rebuild<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::recreate(conn)
    }

    /// Create an empty in-memory store
    pub fn in_memory() -> Result<Self> {
        Self::recreate(Connection::open_in_memory()?)
    }

    /// Open an existing store read-only for querying
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| Error::index_load(format!("{}: {}", path.display(), e)))?;

        let has_table: Option<String> = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'chunks'",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::index_load(format!("{}: {}", path.display(), e)))?;
        if has_table.is_none() {
            return Err(Error::index_load(format!(
                "{} has no chunks table",
                path.display()
            )));
        }

        let max_id: Option<i64> = conn
            .query_row("SELECT MAX(id) FROM chunks", [], |row| row.get(0))
            .map_err(|e| Error::index_load(format!("{}: {}", path.display(), e)))?;

        Ok(Self {
            inner: Mutex::new(StoreInner {
                conn,
                next_id: max_id.unwrap_or(0) + 1,
            }),
        })
    }

    fn recreate(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            DROP TABLE IF EXISTS chunks;
            CREATE TABLE chunks (
                id INTEGER PRIMARY KEY,
                source TEXT NOT NULL,
                section_title TEXT NOT NULL,
                anchor TEXT NOT NULL,
                text TEXT NOT NULL
            );
            "#,
        )?;

        tracing::debug!("Chunk table recreated");
        Ok(Self {
            inner: Mutex::new(StoreInner { conn, next_id: 1 }),
        })
    }

    /// Insert one chunk, returning its id
    pub fn insert(&self, chunk: &ChunkFields) -> Result<i64> {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.conn.execute(
            "INSERT INTO chunks (id, source, section_title, anchor, text) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, chunk.source_id, chunk.section_title, chunk.anchor, chunk.text],
        )?;
        inner.next_id += 1;
        Ok(id)
    }

    /// Insert chunks in order inside one transaction
    pub fn insert_all(&self, chunks: &[ChunkFields]) -> Result<Vec<i64>> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let mut inner = self.inner.lock();
        let first_id = inner.next_id;
        let tx = inner.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO chunks (id, source, section_title, anchor, text) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (offset, chunk) in chunks.iter().enumerate() {
                stmt.execute(params![
                    first_id + offset as i64,
                    chunk.source_id,
                    chunk.section_title,
                    chunk.anchor,
                    chunk.text,
                ])?;
            }
        }
        tx.commit()?;

        inner.next_id = first_id + chunks.len() as i64;
        Ok((first_id..inner.next_id).collect())
    }

    /// Fetch a chunk by id
    pub fn get(&self, id: i64) -> Result<Option<Chunk>> {
        let inner = self.inner.lock();
        let chunk = inner
            .conn
            .query_row(
                "SELECT id, source, section_title, anchor, text FROM chunks WHERE id = ?1",
                params![id],
                row_to_chunk,
            )
            .optional()?;
        Ok(chunk)
    }

    /// Number of stored chunks
    pub fn count(&self) -> Result<usize> {
        let inner = self.inner.lock();
        let count: i64 = inner
            .conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn row_to_chunk(row: &rusqlite::Row) -> rusqlite::Result<Chunk> {
    let fields = ChunkFields {
        source_id: row.get(1)?,
        section_title: row.get(2)?,
        anchor: row.get(3)?,
        text: row.get(4)?,
    };
    Ok(fields.with_id(row.get(0)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(text: &str) -> ChunkFields {
        ChunkFields {
            source_id: "manual.md".to_string(),
            section_title: "Manual / Setup".to_string(),
            anchor: "setup".to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_ids_are_sequential_from_one() {
        let store = MetadataStore::in_memory().unwrap();
        assert_eq!(store.insert(&fields("a")).unwrap(), 1);
        assert_eq!(store.insert(&fields("b")).unwrap(), 2);
        assert_eq!(
            store.insert_all(&[fields("c"), fields("d")]).unwrap(),
            vec![3, 4]
        );
        assert_eq!(store.count().unwrap(), 4);

        let chunk = store.get(3).unwrap().unwrap();
        assert_eq!(chunk.text, "c");
        assert_eq!(chunk.section_title, "Manual / Setup");
        assert_eq!(chunk.ordinal(), 2);
    }

    #[test]
    fn test_missing_id_is_none() {
        let store = MetadataStore::in_memory().unwrap();
        store.insert(&fields("a")).unwrap();
        assert!(store.get(0).unwrap().is_none());
        assert!(store.get(2).unwrap().is_none());
    }

    #[test]
    fn test_rebuild_discards_previous_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunks.sqlite");

        {
            let store = MetadataStore::rebuild(&path).unwrap();
            store.insert_all(&[fields("old1"), fields("old2")]).unwrap();
        }

        let store = MetadataStore::rebuild(&path).unwrap();
        assert_eq!(store.count().unwrap(), 0);
        assert_eq!(store.insert(&fields("new")).unwrap(), 1);
        drop(store);

        let reopened = MetadataStore::open(&path).unwrap();
        assert_eq!(reopened.count().unwrap(), 1);
        assert_eq!(reopened.get(1).unwrap().unwrap().text, "new");
    }

    #[test]
    fn test_open_requires_chunk_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.sqlite");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE other (x INTEGER)").unwrap();
        drop(conn);

        let err = MetadataStore::open(&path).err().unwrap();
        assert!(err.is_load_failure());
    }

    #[test]
    fn test_open_malformed_chunk_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunks.sqlite");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE chunks (body TEXT)").unwrap();
        drop(conn);

        let err = MetadataStore::open(&path).err().unwrap();
        assert!(matches!(err, Error::IndexLoad(_)));
    }
}
