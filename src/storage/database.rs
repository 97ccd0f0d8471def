//! SQLite store for documents and their chunks
//!
//! The relational record is the source of truth; the vector index can be
//! rebuilt from it. Fingerprint uniqueness is enforced here so concurrent
//! identical uploads cannot both insert.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{Chunk, Document, DocumentItem};

/// Paging and filtering for document listings.
#[derive(Debug, Clone, Default)]
pub struct DocumentListQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub filename_contains: Option<String>,
}

/// SQLite-backed document store.
pub struct DocumentDb {
    conn: Arc<Mutex<Connection>>,
}

impl DocumentDb {
    /// Create or open the database at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .map_err(|e| Error::storage(format!("Failed to open database: {}", e)))?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.migrate()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::storage(format!("Failed to open in-memory database: {}", e)))?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;
        "#,
        )
        .map_err(|e| Error::storage(format!("Failed to set pragmas: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                filename TEXT NOT NULL,
                fingerprint TEXT NOT NULL UNIQUE,
                size INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_documents_fingerprint ON documents(fingerprint);
            CREATE INDEX IF NOT EXISTS idx_documents_filename ON documents(filename);

            CREATE TABLE IF NOT EXISTS chunks (
                id TEXT PRIMARY KEY,
                document_id TEXT NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                content TEXT NOT NULL,
                page INTEGER,
                metadata TEXT NOT NULL DEFAULT '{}'
            );

            CREATE INDEX IF NOT EXISTS idx_chunks_document_id ON chunks(document_id);
        "#,
        )
        .map_err(|e| Error::storage(format!("Failed to run migrations: {}", e)))?;

        Ok(())
    }

    /// Insert a document and all of its chunks in one transaction.
    ///
    /// A fingerprint collision surfaces as [`Error::DuplicateFingerprint`]
    /// so the caller can fall back to the existing record.
    pub fn insert_document_with_chunks(&self, doc: &Document, chunks: &[Chunk]) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::storage(format!("Failed to begin transaction: {}", e)))?;

        let inserted = tx.execute(
            "INSERT INTO documents (id, filename, fingerprint, size, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                doc.id.to_string(),
                doc.filename,
                doc.fingerprint,
                doc.size,
                doc.created_at.to_rfc3339(),
            ],
        );
        if let Err(e) = inserted {
            if is_constraint_violation(&e) {
                return Err(Error::DuplicateFingerprint(doc.fingerprint.clone()));
            }
            return Err(Error::storage(format!("Failed to insert document: {}", e)));
        }

        for chunk in chunks {
            let metadata = serde_json::to_string(&chunk.metadata)?;
            tx.execute(
                "INSERT INTO chunks (id, document_id, content, page, metadata)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    Uuid::new_v4().to_string(),
                    doc.id.to_string(),
                    chunk.content,
                    chunk.page_number,
                    metadata,
                ],
            )
            .map_err(|e| Error::storage(format!("Failed to insert chunk: {}", e)))?;
        }

        tx.commit()
            .map_err(|e| Error::storage(format!("Failed to commit: {}", e)))?;
        Ok(())
    }

    /// Look up a document by content fingerprint.
    pub fn find_by_fingerprint(&self, fingerprint: &str) -> Result<Option<Document>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, filename, fingerprint, size, created_at
             FROM documents WHERE fingerprint = ?1",
            params![fingerprint],
            row_to_document,
        )
        .optional()
        .map_err(|e| Error::storage(format!("Fingerprint lookup failed: {}", e)))
    }

    /// Fetch a document by id.
    pub fn get_document(&self, id: &Uuid) -> Result<Option<Document>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, filename, fingerprint, size, created_at
             FROM documents WHERE id = ?1",
            params![id.to_string()],
            row_to_document,
        )
        .optional()
        .map_err(|e| Error::storage(format!("Document lookup failed: {}", e)))
    }

    /// Number of chunks stored for a document.
    pub fn count_chunks(&self, document_id: &Uuid) -> Result<u64> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT COUNT(*) FROM chunks WHERE document_id = ?1",
            params![document_id.to_string()],
            |row| row.get::<_, u64>(0),
        )
        .map_err(|e| Error::storage(format!("Chunk count failed: {}", e)))
    }

    /// List documents newest first, with chunk counts.
    pub fn list_documents(&self, query: &DocumentListQuery) -> Result<Vec<DocumentItem>> {
        let limit = query.limit.unwrap_or(50).clamp(1, 100);
        let offset = query.offset.unwrap_or(0);
        let pattern = query
            .filename_contains
            .as_deref()
            .map(|s| format!("%{}%", escape_like(s)));

        let conn = self.conn.lock();
        let sql = "SELECT d.id, d.filename, d.created_at, d.size, COUNT(c.id)
             FROM documents d
             LEFT JOIN chunks c ON c.document_id = d.id
             WHERE (?1 IS NULL OR d.filename LIKE ?1 ESCAPE '\\')
             GROUP BY d.id
             ORDER BY d.created_at DESC
             LIMIT ?2 OFFSET ?3";
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| Error::storage(format!("Failed to prepare listing: {}", e)))?;

        let rows = stmt
            .query_map(params![pattern, limit, offset], |row| {
                let id: String = row.get(0)?;
                Ok(DocumentItem {
                    id: parse_uuid(&id, 0)?,
                    filename: row.get(1)?,
                    created_at: row.get(2)?,
                    size: row.get(3)?,
                    chunks: row.get(4)?,
                })
            })
            .map_err(|e| Error::storage(format!("Listing failed: {}", e)))?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row.map_err(|e| Error::storage(format!("Listing row failed: {}", e)))?);
        }
        Ok(items)
    }

    /// Cheap liveness probe for health reporting.
    pub fn ping(&self) -> Result<bool> {
        let conn = self.conn.lock();
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map(|v| v == 1)
            .map_err(|e| Error::storage(format!("Ping failed: {}", e)))
    }

    /// Delete a document; chunks cascade. Returns whether it existed.
    pub fn delete_document(&self, id: &Uuid) -> Result<bool> {
        let conn = self.conn.lock();
        let deleted = conn
            .execute(
                "DELETE FROM documents WHERE id = ?1",
                params![id.to_string()],
            )
            .map_err(|e| Error::storage(format!("Delete failed: {}", e)))?;
        Ok(deleted > 0)
    }
}

fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<Document> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(4)?;
    Ok(Document {
        id: parse_uuid(&id, 0)?,
        filename: row.get(1)?,
        fingerprint: row.get(2)?,
        size: row.get(3)?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    4,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
    })
}

fn parse_uuid(raw: &str, column: usize) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
