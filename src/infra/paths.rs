// src/infra/paths.rs — XDG-compliant path management
//
// All paths respect the KBDEDUP_HOME environment variable for isolation.
// When KBDEDUP_HOME is set, config and data live under that directory.
// When unset, config uses ~/.kbdedup/ and data uses XDG_DATA_HOME/kbdedup.

use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Returns the KBDEDUP_HOME override, if set.
fn kbdedup_home() -> Option<PathBuf> {
    std::env::var_os("KBDEDUP_HOME").map(PathBuf::from)
}

/// Home directory, or the current directory when none can be determined.
fn dirs_home() -> PathBuf {
    BaseDirs::new()
        .map(|b| b.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Configuration directory: $KBDEDUP_HOME/ or ~/.kbdedup/
pub fn config_dir() -> PathBuf {
    if let Some(home) = kbdedup_home() {
        return home;
    }
    dirs_home().join(".kbdedup")
}

/// Data directory: $KBDEDUP_HOME/data/ or ~/.local/share/kbdedup/
pub fn data_dir() -> PathBuf {
    if let Some(home) = kbdedup_home() {
        return home.join("data");
    }
    ProjectDirs::from("", "", "kbdedup")
        .map(|p| p.data_local_dir().to_path_buf())
        .unwrap_or_else(|| config_dir().join("data"))
}

/// Default database path
pub fn db_path() -> PathBuf {
    data_dir().join("kbdedup.db")
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}
