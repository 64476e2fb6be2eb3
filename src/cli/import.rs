// src/cli/import.rs — Load entries from JSON Lines

use std::io::BufRead;
use std::path::Path;

use tracing::warn;

use crate::corpus::store::Store;
use crate::dedup::types::NewEntry;

/// Insert one entry per non-blank line. Malformed lines are skipped and
/// reported; returns (inserted, skipped).
pub fn import_jsonl(store: &Store, path: &Path) -> anyhow::Result<(usize, usize)> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);

    let mut inserted = 0;
    let mut skipped = 0;
    let tx = store.conn().unchecked_transaction()?;
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<NewEntry>(&line) {
            Ok(entry) => {
                store.insert_entry(&entry)?;
                inserted += 1;
            }
            Err(e) => {
                warn!(line = lineno + 1, error = %e, "Skipping malformed entry");
                skipped += 1;
            }
        }
    }
    tx.commit()?;
    Ok((inserted, skipped))
}

pub fn run_import(store: &Store, file: &str) -> anyhow::Result<()> {
    let (inserted, skipped) = import_jsonl(store, Path::new(file))?;
    println!("Imported {inserted} entries ({skipped} skipped)");
    Ok(())
}
