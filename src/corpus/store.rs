// src/corpus/store.rs — SQLite operations

use chrono::Utc;
use rusqlite::{params, Connection};

use crate::corpus::embeddings::to_blob;
use crate::dedup::types::{EntryId, EntryMeta, NewEntry, SimilarityEdge};

/// Top-k neighbours per anchor among higher ids, ranked by cosine distance
/// inside SQLite. Each anchor's neighbours come from its own `LIMIT`ed
/// subquery. Zero vectors yield a NULL distance and are skipped; empty
/// blobs never reach sqlite-vec.
const SIMILAR_PAIRS_SQL: &str = "
    SELECT a.id, b.id, vec_distance_cosine(a.embedding, b.embedding) AS dist
    FROM json_each(?1) AS anchors
    JOIN entries a ON a.id = anchors.value AND length(a.embedding) > 0
    JOIN entries b ON b.id IN (
        SELECT c.id FROM entries c
        WHERE c.id > a.id
          AND length(c.embedding) > 0
          AND vec_distance_cosine(a.embedding, c.embedding) IS NOT NULL
        ORDER BY vec_distance_cosine(a.embedding, c.embedding), c.id
        LIMIT ?2
    )
    ORDER BY a.id, dist, b.id";

/// Low-level SQLite operations over the entry corpus.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    // -- Writes --

    pub fn insert_entry(&self, entry: &NewEntry) -> anyhow::Result<EntryId> {
        let now = Utc::now().to_rfc3339();
        // An empty vector is stored as "no embedding"
        let blob = entry
            .embedding
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(to_blob);
        self.conn.execute(
            "INSERT INTO entries (title, content, status, confidence, embedding, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.title,
                entry.content,
                entry.status,
                entry.confidence,
                blob,
                now
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Delete the given ids. Ids that are already gone contribute nothing.
    pub fn delete_by_ids(&self, ids: &[EntryId]) -> anyhow::Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let json = serde_json::to_string(ids)?;
        let deleted = self.conn.execute(
            "DELETE FROM entries WHERE id IN (SELECT value FROM json_each(?1))",
            params![json],
        )?;
        Ok(deleted)
    }

    // -- Reads --

    /// Ids carrying a non-empty embedding, ascending. `None` or `Some(0)` = no cap.
    pub fn candidate_ids(&self, limit: Option<usize>) -> anyhow::Result<Vec<EntryId>> {
        let limit: i64 = match limit {
            Some(n) if n > 0 => i64::try_from(n)?,
            _ => -1,
        };
        let mut stmt = self.conn.prepare(
            "SELECT id FROM entries WHERE length(embedding) > 0 ORDER BY id LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| row.get::<_, EntryId>(0))?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Pairs (anchor, neighbour) with neighbour > anchor, at most `k` per
    /// anchor, keeping only scores at or above `threshold`.
    pub fn similar_pairs(
        &self,
        anchors: &[EntryId],
        k: usize,
        threshold: f32,
    ) -> anyhow::Result<Vec<SimilarityEdge>> {
        if anchors.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let json = serde_json::to_string(anchors)?;
        let mut stmt = self.conn.prepare(SIMILAR_PAIRS_SQL)?;
        let rows = stmt.query_map(params![json, i64::try_from(k)?], |row| {
            Ok((
                row.get::<_, EntryId>(0)?,
                row.get::<_, EntryId>(1)?,
                row.get::<_, Option<f64>>(2)?,
            ))
        })?;

        let mut result = Vec::new();
        for row in rows {
            let (a, b, dist) = row?;
            let Some(dist) = dist else { continue };
            let score = (1.0 - dist as f32).clamp(0.0, 1.0);
            if score >= threshold {
                if let Some(edge) = SimilarityEdge::new(a, b, score) {
                    result.push(edge);
                }
            }
        }
        Ok(result)
    }

    /// Metadata for whichever of `ids` still exist, ascending by id.
    pub fn fetch_metadata(&self, ids: &[EntryId]) -> anyhow::Result<Vec<EntryMeta>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let json = serde_json::to_string(ids)?;
        let mut stmt = self.conn.prepare(
            "SELECT id, status, confidence, title FROM entries
             WHERE id IN (SELECT value FROM json_each(?1))
             ORDER BY id",
        )?;
        let rows = stmt.query_map(params![json], |row| {
            Ok(EntryMeta {
                id: row.get(0)?,
                status: row.get(1)?,
                confidence: row.get(2)?,
                title: row.get(3)?,
            })
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    #[cfg(test)]
    pub(crate) fn embedding(&self, id: EntryId) -> anyhow::Result<Option<Vec<f32>>> {
        let blob: Option<Vec<u8>> = self
            .conn
            .query_row(
                "SELECT embedding FROM entries WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        Ok(blob.map(|b| crate::corpus::embeddings::from_blob(&b)))
    }

    pub fn count(&self) -> anyhow::Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn count_embedded(&self) -> anyhow::Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM entries WHERE length(embedding) > 0",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}
