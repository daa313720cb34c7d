//! Locating the processed documents.
//!
//! Search order: an explicit directory (CLI flag or `PQGUIDE_DATA_DIR`), the
//! nearest ancestor of the start directory that holds
//! `scripts/processed-functions.json`, the crate root recorded at build time,
//! and finally `<start>/scripts`. The last candidate may not exist; loading it
//! then falls back to the sample dataset rather than failing.

use crate::catalog::{CatalogSource, ENTRIES_FILE};
use std::path::{Path, PathBuf};

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "PQGUIDE_DATA_DIR";
/// Data directory name relative to a project root.
pub const DEFAULT_DATA_DIR: &str = "scripts";

/// Returns true when `dir` holds the processed entries document.
fn is_data_dir(dir: &Path) -> bool {
    dir.join(ENTRIES_FILE).is_file()
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(DEFAULT_DATA_DIR);
        if is_data_dir(&candidate) {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

fn data_dir_from_hint(hint: &str) -> Option<PathBuf> {
    if hint.is_empty() {
        return None;
    }
    let candidate = Path::new(hint).join(DEFAULT_DATA_DIR);
    is_data_dir(&candidate).then_some(candidate)
}

/// Resolve the data directory starting from `start`.
///
/// `explicit` wins unconditionally, even if it does not exist, so a typo in a
/// flag shows up as a fallback warning instead of silently reading another
/// catalog.
pub fn resolve_data_dir(explicit: Option<&Path>, start: &Path) -> PathBuf {
    if let Some(dir) = explicit {
        tracing::debug!(dir = %dir.display(), "using explicit data dir");
        return dir.to_path_buf();
    }

    if let Some(dir) = search_upwards(start) {
        tracing::debug!(dir = %dir.display(), "found data dir above start");
        return dir;
    }

    if let Some(dir) = option_env!("PQGUIDE_ROOT_HINT").and_then(data_dir_from_hint) {
        tracing::debug!(dir = %dir.display(), "using build-time data dir");
        return dir;
    }

    let dir = start.join(DEFAULT_DATA_DIR);
    tracing::debug!(dir = %dir.display(), "no data dir found, defaulting");
    dir
}

/// Build a source from a data directory plus optional per-document overrides.
pub fn catalog_source(
    data_dir: &Path,
    entries: Option<&Path>,
    groups: Option<&Path>,
) -> CatalogSource {
    let mut source = CatalogSource::in_dir(data_dir);
    if let Some(path) = entries {
        source.entries = path.to_path_buf();
    }
    if let Some(path) = groups {
        source.groups = path.to_path_buf();
    }
    source
}
