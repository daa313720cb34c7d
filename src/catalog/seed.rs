//! Reading the processed documents and the fallback dataset.
//!
//! Document-level problems (missing file, bad JSON, wrong top-level shape) are
//! returned as [`LoadError`] so the store can decide to fall back. Record-level
//! problems never fail the load: each record is checked against its embedded
//! schema, and anything that does not validate or deserialize is skipped,
//! logged, and listed in the [`SeedReport`].

use crate::catalog::model::{Compatibility, EntryRecord, Example, GroupRecord, Parameter};
use crate::schema_loader::RecordSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the processed entries document inside a data directory.
pub const ENTRIES_FILE: &str = "processed-functions.json";
/// File name of the processed groups document inside a data directory.
pub const GROUPS_FILE: &str = "processed-categories.json";

/// Locations of the two documents a store is seeded from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogSource {
    pub entries: PathBuf,
    pub groups: PathBuf,
}

impl CatalogSource {
    /// Both documents under their default names in `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            entries: dir.join(ENTRIES_FILE),
            groups: dir.join(GROUPS_FILE),
        }
    }
}

/// Document-level failures that trigger the fallback dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{}: expected a JSON array of records, found {found}", path.display())]
    NotAnArray { path: PathBuf, found: &'static str },
    #[error("record schema unavailable: {0}")]
    Schema(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Entry,
    Group,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Entry => "entry",
            RecordKind::Group => "group",
        }
    }
}

/// A record left out of the store, with its 0-based position in the document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub kind: RecordKind,
    pub index: usize,
    pub reason: String,
}

/// What a load produced besides the records themselves.
///
/// `declared_counts` keeps each group's document `functionCount` (in document
/// order) for drift reporting only; the store never treats it as a count.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub skipped: Vec<SkippedRecord>,
    pub declared_counts: Vec<(String, String)>,
}

/// Records read from both documents, ready to insert.
#[derive(Clone, Debug, Default)]
pub struct SeedDocuments {
    pub groups: Vec<GroupRecord>,
    pub entries: Vec<EntryRecord>,
    pub report: SeedReport,
}

impl SeedDocuments {
    fn from_records(groups: Vec<GroupRecord>, entries: Vec<EntryRecord>) -> Self {
        let declared_counts = groups
            .iter()
            .map(|group| (group.name.clone(), group.function_count.clone()))
            .collect();
        Self {
            groups,
            entries,
            report: SeedReport {
                skipped: Vec::new(),
                declared_counts,
            },
        }
    }
}

/// Read both documents named by `source`.
///
/// Groups are read first so a broken groups document fails fast without
/// parsing the much larger entries document.
pub fn read_documents(source: &CatalogSource) -> Result<SeedDocuments, LoadError> {
    let group_schema = RecordSchema::group().map_err(|err| LoadError::Schema(format!("{err:#}")))?;
    let entry_schema = RecordSchema::entry().map_err(|err| LoadError::Schema(format!("{err:#}")))?;
    tracing::debug!(
        groups = %source.groups.display(),
        entries = %source.entries.display(),
        group_schema = group_schema.schema_version(),
        entry_schema = entry_schema.schema_version(),
        "reading catalog documents"
    );

    let mut skipped = Vec::new();
    let groups: Vec<GroupRecord> =
        read_records(&source.groups, &group_schema, RecordKind::Group, &mut skipped)?;
    let entries: Vec<EntryRecord> =
        read_records(&source.entries, &entry_schema, RecordKind::Entry, &mut skipped)?;

    let mut documents = SeedDocuments::from_records(groups, entries);
    documents.report.skipped = skipped;
    Ok(documents)
}

fn read_records<T: DeserializeOwned>(
    path: &Path,
    schema: &RecordSchema,
    kind: RecordKind,
    skipped: &mut Vec<SkippedRecord>,
) -> Result<Vec<T>, LoadError> {
    let data = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&data).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(LoadError::NotAnArray {
                path: path.to_path_buf(),
                found: value_kind(&other),
            });
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let parsed = schema
            .validate(&item)
            .and_then(|()| serde_json::from_value::<T>(item).map_err(|err| err.to_string()));
        match parsed {
            Ok(record) => records.push(record),
            Err(reason) => {
                tracing::warn!(
                    document = %path.display(),
                    kind = kind.as_str(),
                    index,
                    %reason,
                    "skipping malformed record"
                );
                skipped.push(SkippedRecord {
                    kind,
                    index,
                    reason,
                });
            }
        }
    }
    Ok(records)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// The fixed dataset used when the documents cannot be loaded.
pub fn fallback_documents() -> SeedDocuments {
    let groups = vec![
        fallback_group(
            "access-datafunctions",
            "Functions that enable connection to and retrieval of data from various external data sources.",
            "50",
        ),
        fallback_group(
            "table",
            "Functions that create, manipulate, and transform tables and their structure.",
            "120",
        ),
        fallback_group(
            "text",
            "Text functions manipulate and transform string values.",
            "65",
        ),
        fallback_group("list", "List functions work with list values.", "55"),
        fallback_group(
            "number",
            "Number functions perform mathematical operations on numeric values.",
            "40",
        ),
    ];

    let table_from_rows = EntryRecord {
        syntax: Some("Table.FromRows(rows as list, optional columns as any) as table".to_string()),
        parameters: vec![
            Parameter {
                name: "rows".to_string(),
                kind: "list".to_string(),
                description: "A list of lists, where each inner list represents a row of data."
                    .to_string(),
            },
            Parameter {
                name: "columns".to_string(),
                kind: "any".to_string(),
                description: "Optional column names or column count.".to_string(),
            },
        ],
        return_type: Some("table".to_string()),
        examples: vec![Example {
            title: Some("Basic Example".to_string()),
            code: Some(r#"Table.FromRows({{"Alice", 25}, {"Bob", 30}}, {"Name", "Age"})"#.to_string()),
            output: None,
        }],
        remarks: Some("This function is useful for creating tables from static data.".to_string()),
        compatibility: Compatibility::from([
            ("Power BI".to_string(), true),
            ("Excel".to_string(), true),
            ("Dataflows".to_string(), true),
        ]),
        ..EntryRecord::new(
            "Table.FromRows",
            "table",
            "Creates a table from a list of row values and an optional list of column names.",
        )
    };

    SeedDocuments::from_records(groups, vec![table_from_rows])
}

fn fallback_group(name: &str, description: &str, declared: &str) -> GroupRecord {
    GroupRecord {
        function_count: declared.to_string(),
        ..GroupRecord::new(name, description)
    }
}
