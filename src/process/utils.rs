use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// Logical table name of a data file: its name up to the extension.
pub fn table_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// List `(table_name, path)` for every file in `dir` ending in `.<ext>`,
/// sorted by table name. Other files are skipped with a warning,
/// sub-directories silently.
pub fn list_tables(dir: &Path, ext: &str) -> Result<Vec<(String, PathBuf)>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading directory {:?}", dir))? {
        let path = entry.with_context(|| format!("reading entry in {:?}", dir))?.path();
        if path.is_dir() {
            debug!(path = %path.display(), "skipping directory");
            continue;
        }
        let matches = path
            .extension()
            .and_then(|s| s.to_str())
            .map_or(false, |e| e.eq_ignore_ascii_case(ext));
        match (matches, table_name(&path)) {
            (true, Some(name)) => found.push((name, path)),
            _ => warn!(path = %path.display(), expected = ext, "skipping unexpected file"),
        }
    }
    found.sort();
    Ok(found)
}
