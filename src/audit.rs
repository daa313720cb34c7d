//! Consistency checks between entries and groups.
//!
//! Nothing here is enforced at load time. The audit reports the gaps a
//! maintainer would want to fix in the processed documents: entries that point
//! at a missing group, groups with no entries, repeated entry names, and
//! groups whose declared `functionCount` disagrees with the real count.

use crate::catalog::{CatalogStore, GroupKey};
use serde::Serialize;
use std::collections::BTreeMap;

/// A group whose document-declared count differs from its membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountDrift {
    pub group: String,
    pub declared: String,
    pub actual: usize,
}

/// Findings of [`audit_catalog`]. Every list is sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogAudit {
    /// `(entry name, group)` for entries whose group has no record.
    pub orphaned_entries: Vec<(String, String)>,
    pub empty_groups: Vec<String>,
    pub duplicate_names: Vec<String>,
    pub count_drift: Vec<CountDrift>,
}

impl CatalogAudit {
    pub fn is_clean(&self) -> bool {
        self.orphaned_entries.is_empty()
            && self.empty_groups.is_empty()
            && self.duplicate_names.is_empty()
            && self.count_drift.is_empty()
    }

    /// One line per finding, in a stable order.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for (name, group) in &self.orphaned_entries {
            problems.push(format!("{name} references unknown group '{group}'"));
        }
        for group in &self.empty_groups {
            problems.push(format!("group '{group}' has no entries"));
        }
        for name in &self.duplicate_names {
            problems.push(format!("entry name '{name}' appears more than once"));
        }
        for drift in &self.count_drift {
            problems.push(format!(
                "group '{}' declares {} functions but has {}",
                drift.group, drift.declared, drift.actual
            ));
        }
        problems
    }
}

/// Run every check against a loaded store.
///
/// Count drift is only reported for groups the load declared a count for; a
/// declared count that is not a number is always reported.
pub fn audit_catalog(store: &CatalogStore) -> CatalogAudit {
    let mut orphaned_entries: Vec<(String, String)> = store
        .orphaned_entries()
        .into_iter()
        .map(|entry| (entry.name.clone(), entry.group.clone()))
        .collect();
    orphaned_entries.sort();

    let summaries = store.group_summaries();
    let empty_groups = summaries
        .iter()
        .filter(|summary| summary.function_count == 0)
        .map(|summary| summary.group.name.clone())
        .collect();

    let mut name_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for entry in store.all_entries() {
        *name_counts.entry(entry.name.as_str()).or_insert(0) += 1;
    }
    let duplicate_names = name_counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, _)| name.to_string())
        .collect();

    let mut count_drift: Vec<CountDrift> = store
        .report()
        .declared_counts
        .iter()
        .filter_map(|(group, declared)| {
            let actual = store.group_function_count(group);
            let matches = declared.trim().parse::<usize>().ok() == Some(actual);
            (!matches).then(|| CountDrift {
                group: group.clone(),
                declared: declared.clone(),
                actual,
            })
        })
        .collect();
    count_drift.sort_by(|a, b| GroupKey::new(&a.group).cmp(&GroupKey::new(&b.group)));

    CatalogAudit {
        orphaned_entries,
        empty_groups,
        duplicate_names,
        count_drift,
    }
}
