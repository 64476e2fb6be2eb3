// src/corpus/mod.rs — Entry corpus (SQLite + sqlite-vec)

pub mod embeddings;
pub mod schema;
pub mod store;
pub mod store_server;

use rusqlite::Connection;
use std::path::Path;
use std::sync::Once;

static VEC_EXTENSION: Once = Once::new();

/// Register sqlite-vec as an auto extension so every connection opened
/// afterwards has `vec_distance_cosine` available.
#[allow(clippy::missing_transmute_annotations)]
pub fn register_vec_extension() {
    VEC_EXTENSION.call_once(|| {
        // SAFETY: sqlite3_vec_init has the extension entry point signature
        // SQLite expects; registration happens once before any connection.
        unsafe {
            rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
                sqlite_vec::sqlite3_vec_init as *const (),
            )));
        }
    });
}

/// Owner of the corpus database connection.
pub struct Corpus {
    pub store: store::Store,
}

impl Corpus {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        register_vec_extension();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        schema::run_migrations(&conn)?;

        Ok(Self {
            store: store::Store::new(conn),
        })
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> anyhow::Result<Self> {
        register_vec_extension();
        let conn = Connection::open_in_memory()?;
        schema::run_migrations(&conn)?;
        Ok(Self {
            store: store::Store::new(conn),
        })
    }
}
