//! Catalog records in their document and stored forms.
//!
//! `EntryRecord`/`GroupRecord` mirror the processed JSON documents and double
//! as insert payloads. `Entry`/`Group` are what the store hands out: the same
//! fields plus an id, the normalized group key, and timestamps. Documents name
//! the owning group `category`; in Rust the field is `group` everywhere.

use crate::catalog::identity::{EntryId, GroupId, GroupKey, group_label};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Return type reported when an entry does not declare one.
pub const ANY_RETURN_TYPE: &str = "any";

/// Declared `functionCount` used when a group document omits it.
pub const DEFAULT_DECLARED_COUNT: &str = "0";

/// Platform name to support flag (`"Power BI": true`).
pub type Compatibility = BTreeMap<String, bool>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// One positional parameter in a function signature.
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Usage example. Older documents carry the snippet under `syntax`.
pub struct Example {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, alias = "syntax", skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Function definition as it appears in the entries document.
pub struct EntryRecord {
    pub name: String,
    #[serde(rename = "category", alias = "group")]
    pub group: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syntax: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub examples: Vec<Example>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub compatibility: Compatibility,
    #[serde(default, deserialize_with = "null_as_default")]
    pub deprecated: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub volatile: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Category as it appears in the groups document.
///
/// `function_count` is whatever the document declared. The store never keeps
/// it; live counts come from entry membership.
pub struct GroupRecord {
    pub name: String,
    pub description: String,
    #[serde(
        default = "default_declared_count",
        deserialize_with = "declared_count"
    )]
    pub function_count: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Function definition held by the store.
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    #[serde(rename = "category")]
    pub group: String,
    #[serde(skip)]
    pub group_key: GroupKey,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syntax: Option<String>,
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    pub examples: Vec<Example>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    pub compatibility: Compatibility,
    pub deprecated: bool,
    pub volatile: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Category held by the store.
pub struct Group {
    pub id: GroupId,
    pub name: String,
    #[serde(skip)]
    pub key: GroupKey,
    pub description: String,
}

impl EntryRecord {
    /// Minimal record with every optional field left at its default.
    pub fn new(
        name: impl Into<String>,
        group: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            description: description.into(),
            syntax: None,
            parameters: Vec::new(),
            return_type: None,
            examples: Vec::new(),
            remarks: None,
            compatibility: Compatibility::new(),
            deprecated: false,
            volatile: false,
        }
    }
}

impl GroupRecord {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            function_count: default_declared_count(),
        }
    }
}

impl Entry {
    /// Build the stored form; created and updated share one timestamp.
    pub fn from_record(id: EntryId, record: EntryRecord, now: DateTime<Utc>) -> Self {
        Self {
            id,
            group_key: GroupKey::new(&record.group),
            name: record.name,
            group: record.group,
            description: record.description,
            syntax: record.syntax,
            parameters: record.parameters,
            return_type: record.return_type,
            examples: record.examples,
            remarks: record.remarks,
            compatibility: record.compatibility,
            deprecated: record.deprecated,
            volatile: record.volatile,
            created_at: now,
            updated_at: now,
        }
    }

    /// Declared signature, or `Name()` when the document has none.
    pub fn syntax(&self) -> Cow<'_, str> {
        match self.syntax.as_deref() {
            Some(syntax) => Cow::Borrowed(syntax),
            None => Cow::Owned(format!("{}()", self.name)),
        }
    }

    pub fn return_type(&self) -> &str {
        self.return_type.as_deref().unwrap_or(ANY_RETURN_TYPE)
    }

    /// Case-insensitive substring match over name, description, then group.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowered(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.group_key.as_str().contains(needle)
    }

    /// Description split on its `•` bullet markers.
    ///
    /// Text before the first marker is the lead sentence; a description
    /// without markers yields a single item.
    pub fn description_points(&self) -> Vec<&str> {
        self.description
            .split('•')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect()
    }
}

impl Group {
    pub fn from_record(id: GroupId, record: GroupRecord) -> Self {
        Self {
            id,
            key: GroupKey::new(&record.name),
            name: record.name,
            description: record.description,
        }
    }

    pub fn label(&self) -> String {
        group_label(&self.name)
    }
}

fn default_declared_count() -> String {
    DEFAULT_DECLARED_COUNT.to_string()
}

// Documents write `functionCount` as text, but hand-edited ones use numbers.
fn declared_count<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(count) => Ok(count),
        Value::Number(count) => Ok(count.to_string()),
        Value::Null => Ok(default_declared_count()),
        other => Err(serde::de::Error::custom(format!(
            "functionCount must be a string or number, got {other}"
        ))),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entry_record_applies_document_defaults() {
        let record: EntryRecord = serde_json::from_value(json!({
            "name": "Text.Upper",
            "category": "text",
            "description": "Uppercases text.",
            "parameters": null,
            "deprecated": null
        }))
        .unwrap();
        assert_eq!(record.group, "text");
        assert!(record.parameters.is_empty());
        assert!(record.examples.is_empty());
        assert!(record.compatibility.is_empty());
        assert!(!record.deprecated);
        assert!(!record.volatile);
        assert_eq!(record.syntax, None);
    }

    #[test]
    fn entry_record_accepts_group_alias_and_example_syntax() {
        let record: EntryRecord = serde_json::from_value(json!({
            "name": "List.Sum",
            "group": "list",
            "description": "Sums a list.",
            "returnType": "number",
            "examples": [{"title": "Basic", "syntax": "List.Sum({1, 2})", "output": "3"}],
            "compatibility": {"Excel": true, "Dataflows": false}
        }))
        .unwrap();
        assert_eq!(record.group, "list");
        assert_eq!(record.return_type.as_deref(), Some("number"));
        assert_eq!(record.examples[0].code.as_deref(), Some("List.Sum({1, 2})"));
        assert_eq!(record.compatibility.get("Dataflows"), Some(&false));

        let emitted = serde_json::to_value(&record.examples[0]).unwrap();
        assert_eq!(emitted.get("code").and_then(Value::as_str), Some("List.Sum({1, 2})"));
        assert!(emitted.get("syntax").is_none());
    }

    #[test]
    fn group_record_normalizes_declared_count() {
        let missing: GroupRecord =
            serde_json::from_value(json!({"name": "table", "description": "Tables."})).unwrap();
        assert_eq!(missing.function_count, "0");

        let numeric: GroupRecord = serde_json::from_value(
            json!({"name": "table", "description": "Tables.", "functionCount": 120}),
        )
        .unwrap();
        assert_eq!(numeric.function_count, "120");

        let bad = serde_json::from_value::<GroupRecord>(
            json!({"name": "table", "description": "Tables.", "functionCount": [1]}),
        );
        assert!(bad.is_err());
    }

    #[test]
    fn entry_defaults_synthesize_syntax_and_return_type() {
        let now = Utc::now();
        let entry = Entry::from_record(
            EntryId::fresh(),
            EntryRecord::new("Table.RowCount", "Table", "Counts rows."),
            now,
        );
        assert_eq!(entry.syntax(), "Table.RowCount()");
        assert_eq!(entry.return_type(), "any");
        assert_eq!(entry.group_key.as_str(), "table");
        assert_eq!(entry.created_at, entry.updated_at);
    }

    #[test]
    fn entry_serializes_group_as_category() {
        let entry = Entry::from_record(
            EntryId::fresh(),
            EntryRecord::new("Text.Trim", "text", "Trims."),
            Utc::now(),
        );
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value.get("category").and_then(Value::as_str), Some("text"));
        assert!(value.get("group").is_none());
        assert!(value.get("groupKey").is_none());
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn description_points_split_on_bullets() {
        let mut record = EntryRecord::new("Table.Sort", "table", "Sorts a table. • By column • By comparer");
        let entry = Entry::from_record(EntryId::fresh(), record.clone(), Utc::now());
        assert_eq!(
            entry.description_points(),
            vec!["Sorts a table.", "By column", "By comparer"]
        );

        record.description = "Plain text.".to_string();
        let entry = Entry::from_record(EntryId::fresh(), record, Utc::now());
        assert_eq!(entry.description_points(), vec!["Plain text."]);
    }
}
