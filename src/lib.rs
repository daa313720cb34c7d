//! Shared library for the pqguide function reference.
//!
//! The crate loads the processed Power Query M function and category documents
//! into an in-memory [`CatalogStore`] and answers the lookups the reference
//! site needs: by id, by name, by group, sorted listings and substring search.
//! Around the store sit the consistency audit, the static snapshot export
//! used by the client-rendered site, and plain-text renderers for the CLI.

pub mod audit;
pub mod catalog;
pub mod config;
pub mod render;
pub mod snapshot;

mod schema_loader;

pub use audit::{CatalogAudit, CountDrift, audit_catalog};
pub use catalog::{
    CatalogOrigin, CatalogSource, CatalogStore, Entry, EntryFilter, EntryId, EntryRecord, Group,
    GroupId, GroupRecord, GroupSummary, LoadError, SUGGESTION_LIMIT, SeedReport,
};
pub use config::{DATA_DIR_ENV, catalog_source, resolve_data_dir};
pub use snapshot::{ENTRIES_SNAPSHOT, GROUPS_SNAPSHOT, SnapshotPaths, write_snapshot};
