//! In-memory store for entries and groups.
//!
//! Both collections keep insertion order in a `Vec` with an id index beside
//! it, so unsorted queries return records in document order and sorted ones
//! are deterministic for identical input. A store is constructed already
//! loaded; after that it is plain owned data and can be shared across threads
//! by reference or `Arc` without locking. Insertion needs `&mut self`.

use crate::catalog::identity::{EntryId, GroupId, GroupKey, collate};
use crate::catalog::model::{Entry, EntryRecord, Group, GroupRecord};
use crate::catalog::seed::{
    CatalogSource, LoadError, SeedDocuments, SeedReport, fallback_documents, read_documents,
};
use chrono::Utc;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Default cap for [`CatalogStore::name_suggestions`].
pub const SUGGESTION_LIMIT: usize = 20;

/// Where the store's records came from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CatalogOrigin {
    /// Built with `CatalogStore::default()`; nothing was loaded.
    #[default]
    Empty,
    /// Seeded from the processed documents.
    Documents,
    /// Built from records handed over in memory.
    Records,
    /// The documents could not be loaded; the fixed dataset was used instead.
    Fallback { reason: String },
}

/// Listing filter: an optional text query and an optional group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryFilter {
    /// Case-insensitive substring of name or description. Empty means unfiltered.
    pub query: Option<String>,
    /// Group name, compared case-insensitively. Empty means unfiltered.
    pub group: Option<String>,
}

/// A group together with its live membership count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary<'a> {
    #[serde(flatten)]
    pub group: &'a Group,
    pub function_count: usize,
}

#[derive(Clone, Debug, Default)]
/// Entries and groups held in memory, indexed by id.
pub struct CatalogStore {
    entries: Vec<Entry>,
    entry_index: HashMap<EntryId, usize>,
    groups: Vec<Group>,
    group_index: HashMap<GroupId, usize>,
    origin: CatalogOrigin,
    report: SeedReport,
}

impl CatalogStore {
    /// Load the catalog, substituting the fallback dataset on any document
    /// failure. Never fails; the returned store is ready for queries.
    pub fn load(source: &CatalogSource) -> Self {
        match Self::try_load(source) {
            Ok(store) => store,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load catalog documents, using fallback dataset");
                Self::fallback(err.to_string())
            }
        }
    }

    /// Load the catalog, returning document failures instead of falling back.
    pub fn try_load(source: &CatalogSource) -> Result<Self, LoadError> {
        let documents = read_documents(source)?;
        let store = Self::seed(documents, CatalogOrigin::Documents);
        tracing::info!(
            entries = store.entry_count(),
            groups = store.group_count(),
            skipped = store.report.skipped.len(),
            "loaded catalog documents"
        );
        Ok(store)
    }

    /// A store holding only the fixed fallback dataset.
    pub fn fallback(reason: impl Into<String>) -> Self {
        Self::seed(
            fallback_documents(),
            CatalogOrigin::Fallback {
                reason: reason.into(),
            },
        )
    }

    /// Seed from already-parsed records, in the order given.
    pub fn from_records<G, E>(groups: G, entries: E) -> Self
    where
        G: IntoIterator<Item = GroupRecord>,
        E: IntoIterator<Item = EntryRecord>,
    {
        let mut store = Self {
            origin: CatalogOrigin::Records,
            ..Self::default()
        };
        for group in groups {
            store.create_group(group);
        }
        for entry in entries {
            store.create_entry(entry);
        }
        store
    }

    fn seed(documents: SeedDocuments, origin: CatalogOrigin) -> Self {
        let mut store = Self::from_records(documents.groups, documents.entries);
        store.origin = origin;
        store.report = documents.report;
        store
    }

    pub fn origin(&self) -> &CatalogOrigin {
        &self.origin
    }

    /// Records skipped during load and the declared group counts.
    pub fn report(&self) -> &SeedReport {
        &self.report
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Resolve an entry by id. Absence is a normal result.
    pub fn entry(&self, id: &EntryId) -> Option<&Entry> {
        self.entry_index.get(id).map(|&pos| &self.entries[pos])
    }

    /// First entry, in insertion order, whose name equals `name` exactly.
    pub fn entry_by_name(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Entries whose group matches `group` case-insensitively, in insertion order.
    pub fn entries_by_group(&self, group: &str) -> Vec<&Entry> {
        let key = GroupKey::new(group);
        self.entries
            .iter()
            .filter(|entry| entry.group_key == key)
            .collect()
    }

    /// Every entry, sorted by name.
    pub fn all_entries(&self) -> Vec<&Entry> {
        let mut entries: Vec<&Entry> = self.entries.iter().collect();
        // Stable sort: identical names keep insertion order.
        entries.sort_by(|a, b| collate(&a.name, &b.name));
        entries
    }

    /// Entries whose name, description, or group contains `query`,
    /// case-insensitively, in insertion order.
    ///
    /// An empty query matches nothing; use [`CatalogStore::all_entries`] for
    /// the full listing.
    pub fn search_entries(&self, query: &str) -> Vec<&Entry> {
        if query.is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| entry.matches_lowered(&needle))
            .collect()
    }

    /// Listing filter used by the functions index, sorted by name.
    ///
    /// Unlike [`CatalogStore::search_entries`] the query only looks at name and
    /// description, and a missing or empty query leaves the listing unfiltered.
    pub fn filter_entries(&self, filter: &EntryFilter) -> Vec<&Entry> {
        let needle = filter
            .query
            .as_deref()
            .filter(|query| !query.is_empty())
            .map(str::to_lowercase);
        let key = filter
            .group
            .as_deref()
            .filter(|group| !group.is_empty())
            .map(GroupKey::new);

        let mut entries: Vec<&Entry> = self
            .entries
            .iter()
            .filter(|entry| key.as_ref().is_none_or(|key| &entry.group_key == key))
            .filter(|entry| {
                needle.as_deref().is_none_or(|needle| {
                    entry.name.to_lowercase().contains(needle)
                        || entry.description.to_lowercase().contains(needle)
                })
            })
            .collect();
        entries.sort_by(|a, b| collate(&a.name, &b.name));
        entries
    }

    /// Quick name search: sorted matches on name only, at most `limit` of them.
    pub fn name_suggestions(&self, query: &str, limit: usize) -> Vec<&Entry> {
        if query.is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        let mut entries: Vec<&Entry> = self
            .entries
            .iter()
            .filter(|entry| entry.name.to_lowercase().contains(&needle))
            .collect();
        entries.sort_by(|a, b| collate(&a.name, &b.name));
        entries.truncate(limit);
        entries
    }

    /// Insert a new entry with a fresh id and the current time.
    ///
    /// Names are not checked for uniqueness.
    pub fn create_entry(&mut self, record: EntryRecord) -> Entry {
        let entry = Entry::from_record(EntryId::fresh(), record, Utc::now());
        self.entry_index.insert(entry.id, self.entries.len());
        self.entries.push(entry.clone());
        entry
    }

    /// Resolve a group by id.
    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.group_index.get(id).map(|&pos| &self.groups[pos])
    }

    /// Group whose name matches `name` case-insensitively.
    pub fn group_by_name(&self, name: &str) -> Option<&Group> {
        let key = GroupKey::new(name);
        self.groups.iter().find(|group| group.key == key)
    }

    /// Every group, sorted by name.
    pub fn all_groups(&self) -> Vec<&Group> {
        let mut groups: Vec<&Group> = self.groups.iter().collect();
        groups.sort_by(|a, b| collate(&a.name, &b.name));
        groups
    }

    /// Insert a new group with a fresh id.
    ///
    /// The record's declared `function_count` is dropped; counts are always
    /// computed from membership.
    pub fn create_group(&mut self, record: GroupRecord) -> Group {
        let group = Group::from_record(GroupId::fresh(), record);
        self.group_index.insert(group.id, self.groups.len());
        self.groups.push(group.clone());
        group
    }

    /// Number of entries whose group matches `name` case-insensitively.
    pub fn group_function_count(&self, name: &str) -> usize {
        let key = GroupKey::new(name);
        self.entries
            .iter()
            .filter(|entry| entry.group_key == key)
            .count()
    }

    /// Every group, sorted by name, with its live entry count.
    pub fn group_summaries(&self) -> Vec<GroupSummary<'_>> {
        let mut counts: HashMap<&GroupKey, usize> = HashMap::new();
        for entry in &self.entries {
            *counts.entry(&entry.group_key).or_insert(0) += 1;
        }
        self.all_groups()
            .into_iter()
            .map(|group| GroupSummary {
                group,
                function_count: counts.get(&group.key).copied().unwrap_or(0),
            })
            .collect()
    }

    /// Entries whose group has no group record, in insertion order.
    ///
    /// They stay reachable by id, name, search and the full listing, but no
    /// group view ever shows them.
    pub fn orphaned_entries(&self) -> Vec<&Entry> {
        let known: BTreeSet<&GroupKey> = self.groups.iter().map(|group| &group.key).collect();
        self.entries
            .iter()
            .filter(|entry| !known.contains(&entry.group_key))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn entry(name: &str, group: &str, description: &str) -> EntryRecord {
        EntryRecord::new(name, group, description)
    }

    fn sample_store() -> CatalogStore {
        CatalogStore::from_records(
            [
                GroupRecord::new("text", "Text functions."),
                GroupRecord::new("table", "Table functions."),
            ],
            [
                entry("Table.Sort", "table", "Sorts rows of a table."),
                entry("Text.Upper", "text", "Returns the uppercase of a text value."),
                entry("Table.AddColumn", "Table", "Adds a column computed from each row."),
            ],
        )
    }

    fn names(entries: &[&Entry]) -> Vec<String> {
        entries.iter().map(|entry| entry.name.clone()).collect()
    }

    #[test]
    fn create_entry_round_trips_through_id_lookup() {
        let mut store = CatalogStore::default();
        assert_eq!(store.origin(), &CatalogOrigin::Empty);
        let created = store.create_entry(entry("List.Sum", "list", "Sums numbers."));
        assert_eq!(store.entry(&created.id), Some(&created));
        assert_eq!(store.entry(&EntryId::fresh()), None);
        assert_eq!(store.entry_count(), 1);
    }

    #[test]
    fn origin_tracks_how_the_store_was_built() {
        assert_eq!(sample_store().origin(), &CatalogOrigin::Records);
        assert!(matches!(
            CatalogStore::fallback("gone").origin(),
            CatalogOrigin::Fallback { .. }
        ));
    }

    #[test]
    fn create_entry_allows_duplicate_names() {
        let mut store = CatalogStore::default();
        let first = store.create_entry(entry("List.Sum", "list", "first"));
        let second = store.create_entry(entry("List.Sum", "list", "second"));
        assert_ne!(first.id, second.id);
        assert_eq!(store.entry_by_name("List.Sum").map(|e| e.id), Some(first.id));
    }

    #[test]
    fn entry_by_name_is_exact_and_case_sensitive() {
        let store = sample_store();
        assert!(store.entry_by_name("Table.Sort").is_some());
        assert!(store.entry_by_name("table.sort").is_none());
        assert!(store.entry_by_name("Table.Sor").is_none());
    }

    #[test]
    fn entries_by_group_ignores_case_on_both_sides() {
        let store = sample_store();
        assert_eq!(
            names(&store.entries_by_group("TABLE")),
            vec!["Table.Sort", "Table.AddColumn"]
        );
        assert!(store.entries_by_group("number").is_empty());
    }

    #[test]
    fn all_entries_is_sorted_regardless_of_insertion_order() {
        let store = sample_store();
        assert_eq!(
            names(&store.all_entries()),
            vec!["Table.AddColumn", "Table.Sort", "Text.Upper"]
        );
        assert_eq!(names(&store.all_entries()), names(&store.all_entries()));
    }

    #[test]
    fn search_matches_name_description_and_group() {
        let store = sample_store();
        assert_eq!(names(&store.search_entries("UPPER")), vec!["Text.Upper"]);
        assert_eq!(names(&store.search_entries("each row")), vec!["Table.AddColumn"]);
        assert_eq!(
            names(&store.search_entries("tab")),
            vec!["Table.Sort", "Table.AddColumn"]
        );
        assert_eq!(names(&store.search_entries("tex")), vec!["Text.Upper"]);
        assert!(store.search_entries("zzz").is_empty());
    }

    #[test]
    fn empty_search_matches_nothing() {
        let store = sample_store();
        assert!(store.search_entries("").is_empty());
        assert!(store.name_suggestions("", SUGGESTION_LIMIT).is_empty());
    }

    #[test]
    fn filter_combines_query_and_group() {
        let store = sample_store();
        let everything = store.filter_entries(&EntryFilter::default());
        assert_eq!(everything.len(), 3);

        let blank = EntryFilter {
            query: Some(String::new()),
            group: None,
        };
        assert_eq!(store.filter_entries(&blank).len(), 3);

        let table_rows = EntryFilter {
            query: Some("ROW".to_string()),
            group: Some("table".to_string()),
        };
        assert_eq!(
            names(&store.filter_entries(&table_rows)),
            vec!["Table.AddColumn", "Table.Sort"]
        );

        let blank_group = EntryFilter {
            query: None,
            group: Some(String::new()),
        };
        assert_eq!(store.filter_entries(&blank_group).len(), 3);

        // Group names are not part of the listing query.
        let by_group_name = EntryFilter {
            query: Some("text functions".to_string()),
            group: None,
        };
        assert!(store.filter_entries(&by_group_name).is_empty());
    }

    #[test]
    fn name_suggestions_are_sorted_and_capped() {
        let mut store = CatalogStore::default();
        for idx in (0..30).rev() {
            store.create_entry(entry(&format!("List.F{idx:02}"), "list", "Generated."));
        }
        let hits = store.name_suggestions("list.f", SUGGESTION_LIMIT);
        assert_eq!(hits.len(), SUGGESTION_LIMIT);
        assert_eq!(hits[0].name, "List.F00");
        assert_eq!(hits[19].name, "List.F19");
        assert!(store.name_suggestions("description", 5).is_empty());
    }

    #[test]
    fn groups_sort_and_resolve_case_insensitively() {
        let store = sample_store();
        let all: Vec<&str> = store.all_groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(all, vec!["table", "text"]);

        let table = store.group_by_name("TaBlE").expect("table group");
        assert_eq!(store.group(&table.id), Some(table));
        assert!(store.group_by_name("tables").is_none());
        assert!(store.group(&GroupId::fresh()).is_none());
    }

    #[test]
    fn create_group_does_not_trust_declared_counts() {
        let mut store = sample_store();
        let mut record = GroupRecord::new("number", "Numbers.");
        record.function_count = "40".to_string();
        let group = store.create_group(record);
        assert_eq!(store.group(&group.id), Some(&group));
        assert_eq!(store.group_function_count("number"), 0);
    }

    #[test]
    fn summaries_count_live_membership() {
        let mut store = sample_store();
        let counts: Vec<(String, usize)> = store
            .group_summaries()
            .iter()
            .map(|summary| (summary.group.name.clone(), summary.function_count))
            .collect();
        assert_eq!(counts, vec![("table".to_string(), 2), ("text".to_string(), 1)]);

        store.create_entry(entry("Text.Lower", "TEXT", "Lowercases."));
        assert_eq!(store.group_function_count("text"), 2);
    }

    #[test]
    fn orphaned_entries_are_reachable_but_ungrouped() {
        let mut store = sample_store();
        let orphan = store.create_entry(entry("Json.Document", "json", "Parses JSON."));
        assert_eq!(names(&store.orphaned_entries()), vec!["Json.Document"]);
        assert_eq!(store.entry_by_name("Json.Document"), Some(&orphan));
        assert_eq!(names(&store.search_entries("json")), vec!["Json.Document"]);
        assert!(store.group_by_name("json").is_none());
    }

    #[test]
    fn fallback_store_records_reason() {
        let store = CatalogStore::fallback("missing documents");
        assert_eq!(
            store.origin(),
            &CatalogOrigin::Fallback {
                reason: "missing documents".to_string()
            }
        );
        assert_eq!(store.group_count(), 5);
        assert_eq!(names(&store.entries_by_group("table")), vec!["Table.FromRows"]);
    }

    #[test]
    fn loaded_store_is_shared_across_threads() {
        let store = Arc::new(sample_store());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || names(&store.all_entries()))
            })
            .collect();
        for handle in handles {
            assert_eq!(
                handle.join().unwrap(),
                vec!["Table.AddColumn", "Table.Sort", "Text.Upper"]
            );
        }
    }
}
