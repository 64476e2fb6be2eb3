// src/cli/status.rs — Database status display

use std::path::Path;

use crate::corpus::schema;
use crate::corpus::store::Store;
use crate::infra::paths;

/// Display database location, schema version and entry counts.
pub fn show_status(store: &Store, db_path: &Path) -> anyhow::Result<()> {
    let config_path = paths::config_file_path();
    let config_line = if config_path.exists() {
        format!("{} (loaded)", config_path.display())
    } else {
        "(using defaults)".to_string()
    };
    print!("{}", render_status(store, db_path, &config_line)?);
    Ok(())
}

fn render_status(store: &Store, db_path: &Path, config_line: &str) -> anyhow::Result<String> {
    let db_size = std::fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);

    let mut out = format!("kbdedup v{}\n\n", env!("CARGO_PKG_VERSION"));
    out.push_str(&format!("  Config:     {config_line}\n"));
    out.push_str(&format!(
        "  Database:   {} ({})\n",
        db_path.display(),
        format_bytes(db_size)
    ));
    out.push_str(&format!(
        "  Schema:     v{}\n",
        schema::current_version(store.conn())?
    ));
    out.push_str(&format!("  Entries:    {}\n", store.count()?));
    out.push_str(&format!("  Embedded:   {}\n", store.count_embedded()?));
    Ok(out)
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
