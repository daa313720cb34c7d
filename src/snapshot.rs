//! Static JSON snapshots of a loaded catalog.
//!
//! The static site fetches `functions.json` and `categories.json` instead of
//! calling the store. Snapshots are written from the store so they carry the
//! same defaults, ordering, and live group counts as the query API.

use crate::catalog::{CatalogStore, Entry, GroupId};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const ENTRIES_SNAPSHOT: &str = "functions.json";
pub const GROUPS_SNAPSHOT: &str = "categories.json";

/// Group as the site expects it: `functionCount` is text.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupSnapshot<'a> {
    id: GroupId,
    name: &'a str,
    description: &'a str,
    function_count: String,
}

/// Paths written by [`write_snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPaths {
    pub entries: PathBuf,
    pub groups: PathBuf,
}

/// Write both snapshot documents into `out_dir`, creating it if needed.
///
/// Each file is written to a temporary sibling and renamed into place, so a
/// reader never sees a partially written snapshot.
pub fn write_snapshot(store: &CatalogStore, out_dir: &Path) -> Result<SnapshotPaths> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating snapshot dir {}", out_dir.display()))?;

    let entries: Vec<&Entry> = store.all_entries();
    let groups: Vec<GroupSnapshot<'_>> = store
        .group_summaries()
        .into_iter()
        .map(|summary| GroupSnapshot {
            id: summary.group.id,
            name: &summary.group.name,
            description: &summary.group.description,
            function_count: summary.function_count.to_string(),
        })
        .collect();

    let paths = SnapshotPaths {
        entries: out_dir.join(ENTRIES_SNAPSHOT),
        groups: out_dir.join(GROUPS_SNAPSHOT),
    };
    write_json_atomic(&paths.entries, &entries)?;
    write_json_atomic(&paths.groups, &groups)?;
    tracing::info!(
        entries = entries.len(),
        groups = groups.len(),
        dir = %out_dir.display(),
        "wrote catalog snapshot"
    );
    Ok(paths)
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    serde_json::to_writer_pretty(&mut file, value)
        .with_context(|| format!("serializing {}", path.display()))?;
    file.write_all(b"\n")?;
    file.persist(path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
