//! SQLite chunk store.
//!
//! Persists the corpus of the single active document as ordered
//! (text, embedding, document_id) rows. `replace_all` swaps the entire
//! corpus inside one transaction so readers never observe a half-replaced
//! store.

use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

use docchat_core::error::{DocChatError, Result};
use docchat_core::types::StoredChunk;

pub struct ChunkStore {
    conn: Mutex<Connection>,
}

impl ChunkStore {
    /// Open (or create) the store at `path`. `:memory:` works for tests.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path).map_err(storage_err)?;

        // position is the retrieval-order slot; the index relies on
        // load_all returning rows in exactly this order.
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS chunks (
                position INTEGER PRIMARY KEY,
                content TEXT NOT NULL,
                embedding BLOB NOT NULL,
                document_id TEXT NOT NULL
            );",
        )
        .map_err(storage_err)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Atomically discard every stored chunk and persist `chunks` in input
    /// order. On any failure the transaction rolls back and the previous
    /// corpus remains untouched.
    pub fn replace_all(&self, chunks: &[StoredChunk]) -> Result<()> {
        let mut conn = self.conn.lock().map_err(|e| DocChatError::Storage(e.to_string()))?;
        let tx = conn.transaction().map_err(storage_err)?;

        tx.execute("DELETE FROM chunks", []).map_err(storage_err)?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO chunks (position, content, embedding, document_id)
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .map_err(storage_err)?;
            for (position, chunk) in chunks.iter().enumerate() {
                stmt.execute(rusqlite::params![
                    position as i64,
                    chunk.text,
                    encode_embedding(&chunk.embedding),
                    chunk.document_id,
                ])
                .map_err(storage_err)?;
            }
        }
        tx.commit().map_err(storage_err)?;
        Ok(())
    }

    /// All stored chunks in insertion (retrieval-position) order.
    pub fn load_all(&self) -> Result<Vec<StoredChunk>> {
        let conn = self.conn.lock().map_err(|e| DocChatError::Storage(e.to_string()))?;
        let mut stmt = conn
            .prepare("SELECT content, embedding, document_id FROM chunks ORDER BY position")
            .map_err(storage_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Vec<u8>>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(storage_err)?;

        let mut chunks = Vec::new();
        for row in rows {
            let (text, blob, document_id) = row.map_err(storage_err)?;
            chunks.push(StoredChunk::new(text, decode_embedding(&blob)?, document_id));
        }
        Ok(chunks)
    }

    /// Remove every stored chunk. Used by delete and by the empty-upload
    /// path; a no-op on an already empty store.
    pub fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().map_err(|e| DocChatError::Storage(e.to_string()))?;
        conn.execute("DELETE FROM chunks", []).map_err(storage_err)?;
        Ok(())
    }

    /// Identifier of the currently stored document, if any.
    pub fn status(&self) -> Result<Option<String>> {
        let conn = self.conn.lock().map_err(|e| DocChatError::Storage(e.to_string()))?;
        let mut stmt = conn
            .prepare("SELECT document_id FROM chunks LIMIT 1")
            .map_err(storage_err)?;
        let mut rows = stmt.query([]).map_err(storage_err)?;
        match rows.next().map_err(storage_err)? {
            Some(row) => Ok(Some(row.get(0).map_err(storage_err)?)),
            None => Ok(None),
        }
    }
}

fn storage_err(e: rusqlite::Error) -> DocChatError {
    DocChatError::Storage(e.to_string())
}

fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(vector.len() * 4);
    for value in vector {
        blob.extend_from_slice(&value.to_le_bytes());
    }
    blob
}

fn decode_embedding(blob: &[u8]) -> Result<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return Err(DocChatError::Storage(format!(
            "corrupt embedding blob: {} bytes is not a whole number of f32s",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}
