//! Function catalog wiring.
//!
//! This module loads the processed function and category documents into an
//! in-memory [`CatalogStore`] and exposes the lookups the site needs. Types in
//! `model` mirror the document fields; `seed` owns reading, record validation
//! and the fallback dataset; `identity` holds ids, the normalized group key,
//! and the shared name collation.

pub mod identity;
pub mod model;
pub mod seed;
pub mod store;

pub use identity::{EntryId, GroupId, GroupKey, collate, group_label};
pub use model::{
    ANY_RETURN_TYPE, Compatibility, Entry, EntryRecord, Example, Group, GroupRecord, Parameter,
};
pub use seed::{
    CatalogSource, ENTRIES_FILE, GROUPS_FILE, LoadError, RecordKind, SeedDocuments, SeedReport,
    SkippedRecord, fallback_documents, read_documents,
};
pub use store::{CatalogOrigin, CatalogStore, EntryFilter, GroupSummary, SUGGESTION_LIMIT};
