use anyhow::{Context, Result, bail};
use pqguide::CatalogSource;
use pqguide::catalog::{ENTRIES_FILE, GROUPS_FILE};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// A temporary data directory holding both processed documents.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new(groups: &Value, entries: &Value) -> Result<Self> {
        let dir = TempDir::new().context("failed to allocate fixture dir")?;
        write_document(&dir.path().join(GROUPS_FILE), groups)?;
        write_document(&dir.path().join(ENTRIES_FILE), entries)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn source(&self) -> CatalogSource {
        CatalogSource::in_dir(self.dir.path())
    }
}

pub fn write_document(path: &Path, value: &Value) -> Result<()> {
    let data = serde_json::to_vec_pretty(value)?;
    fs::write(path, data).with_context(|| format!("writing {}", path.display()))
}

/// Run the CLI with logging silenced and no data dir inherited from the
/// environment.
pub fn pqguide(args: &[&str], cwd: &Path) -> Result<Output> {
    let output = Command::new(env!("CARGO_BIN_EXE_pqguide"))
        .args(args)
        .current_dir(cwd)
        .env_remove(pqguide::DATA_DIR_ENV)
        .env("RUST_LOG", "off")
        .output()
        .with_context(|| format!("failed to run pqguide {args:?}"))?;
    Ok(output)
}

pub fn run_ok(args: &[&str], cwd: &Path) -> Result<String> {
    let output = pqguide(args, cwd)?;
    if !output.status.success() {
        bail!(
            "pqguide {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            args,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(String::from_utf8(output.stdout)?)
}
