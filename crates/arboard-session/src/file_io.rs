//! `.arb` file handling.
//!
//! Board files are pretty-printed snapshot JSON.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use arboard_core::Snapshot;
use tracing::info;

/// Extension for full-board snapshot files
pub const ARB_EXTENSION: &str = "arb";

/// Extension for exported drawings
pub const SVG_EXTENSION: &str = "svg";

/// File name used for the autosave snapshot
const AUTOSAVE_FILE: &str = "autosave.arb";

/// Get the default storage path for the autosave snapshot.
///
/// `ARBOARD_DATA_DIR` wins, then `$XDG_DATA_HOME/arboard`, then
/// `~/.local/share/arboard`.
pub fn default_storage_path() -> PathBuf {
    storage_path_from(
        std::env::var_os("ARBOARD_DATA_DIR").map(PathBuf::from),
        std::env::var_os("XDG_DATA_HOME").map(PathBuf::from),
        dirs::home_dir(),
    )
}

fn storage_path_from(data_dir: Option<PathBuf>, xdg_data_home: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = data_dir {
        return dir.join(AUTOSAVE_FILE);
    }
    let data_home = xdg_data_home
        .unwrap_or_else(|| home.unwrap_or_else(|| PathBuf::from(".")).join(".local/share"));
    data_home.join("arboard").join(AUTOSAVE_FILE)
}

/// Save a snapshot as JSON, creating parent directories as needed
pub fn save_snapshot(snapshot: &Snapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("Failed to create {:?}", parent))?;
        }
    }
    let json = snapshot.to_json_pretty()?;
    fs::write(path, json).with_context(|| format!("Failed to save to {:?}", path))?;
    info!(path = %path.display(), boards = snapshot.boards.len(), "saved board file");
    Ok(())
}

/// Load and validate a snapshot file
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read from {:?}", path))?;
    let snapshot =
        Snapshot::from_json_str(&content).with_context(|| format!("Failed to load board file {:?}", path))?;
    info!(path = %path.display(), boards = snapshot.boards.len(), "loaded board file");
    Ok(snapshot)
}

/// Replace characters that are invalid in file names with `-`
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | '?' | '%' | '*' | ':' | '|' | '"' | '<' | '>' => '-',
            other => other,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Suggested file name for a board, e.g. `Family.arb`
pub fn default_file_name(board_name: &str, extension: &str) -> String {
    let stem = sanitize_filename(board_name);
    let stem = if stem.is_empty() { "arboard" } else { stem.as_str() };
    format!("{}.{}", stem, extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arboard_core::{BoardError, GraphStore, Metadata};

    #[test]
    fn sanitizes_reserved_characters() {
        assert_eq!(sanitize_filename("a/b\\c?d%e*f:g|h\"i<j>k"), "a-b-c-d-e-f-g-h-i-j-k");
        assert_eq!(sanitize_filename("  Family Tree  "), "Family Tree");
    }

    #[test]
    fn default_file_name_falls_back_for_blank_names() {
        assert_eq!(default_file_name("Work: Q3", ARB_EXTENSION), "Work- Q3.arb");
        assert_eq!(default_file_name("   ", ARB_EXTENSION), "arboard.arb");
        assert_eq!(default_file_name("a/b", SVG_EXTENSION), "a-b.svg");
    }

    #[test]
    fn storage_path_prefers_explicit_dir_then_xdg_then_home() {
        let explicit = storage_path_from(Some("/data".into()), Some("/xdg".into()), Some("/home/u".into()));
        assert_eq!(explicit, PathBuf::from("/data/autosave.arb"));

        let xdg = storage_path_from(None, Some("/xdg".into()), Some("/home/u".into()));
        assert_eq!(xdg, PathBuf::from("/xdg/arboard/autosave.arb"));

        let home = storage_path_from(None, None, Some("/home/u".into()));
        assert_eq!(home, PathBuf::from("/home/u/.local/share/arboard/autosave.arb"));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("family.arb");

        let mut store = GraphStore::new();
        store.add_node("Alice", 10.0, 20.0, Metadata::with_notes("hi")).unwrap();
        save_snapshot(&store.export_data(), &path).unwrap();

        let loaded = GraphStore::from_snapshot(load_snapshot(&path).unwrap());
        assert_eq!(loaded, store);
    }

    #[test]
    fn load_reports_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.arb");
        fs::write(&path, r#"{"version":"1.0"}"#).unwrap();

        let err = load_snapshot(&path).unwrap_err();
        let board_err = err.downcast_ref::<BoardError>().unwrap();
        assert!(matches!(board_err, BoardError::MalformedSnapshot(_)));
    }

    #[test]
    fn load_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_snapshot(&dir.path().join("missing.arb")).is_err());
    }
}
