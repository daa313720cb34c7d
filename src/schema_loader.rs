//! Compiled JSON Schemas for the processed catalog documents.
//!
//! Schemas live under `schema/` and are embedded at build time, so a missing
//! schema file is a build error rather than a runtime fallback. Each schema
//! describes a single record; the loader validates records one by one so a bad
//! record can be skipped without rejecting its whole document.

use anyhow::{Result, anyhow};
use jsonschema::JSONSchema;
use serde_json::Value;

const ENTRY_RECORD_SCHEMA: &str = include_str!("../schema/entry_record.schema.json");
const GROUP_RECORD_SCHEMA: &str = include_str!("../schema/group_record.schema.json");
const SCHEMA_VERSION_POINTER: &str = "/schema_version";

/// A compiled record schema plus the version tag it declares.
pub(crate) struct RecordSchema {
    schema_version: String,
    compiled: JSONSchema,
}

impl RecordSchema {
    pub fn entry() -> Result<Self> {
        Self::compile("entry record", ENTRY_RECORD_SCHEMA)
    }

    pub fn group() -> Result<Self> {
        Self::compile("group record", GROUP_RECORD_SCHEMA)
    }

    pub fn compile(label: &str, raw: &str) -> Result<Self> {
        let schema: Value =
            serde_json::from_str(raw).map_err(|err| anyhow!("parsing {label} schema: {err}"))?;
        let schema_version = extract_schema_version(&schema, SCHEMA_VERSION_POINTER)
            .ok_or_else(|| anyhow!("{label} schema missing schema_version"))?;
        // Compilation errors borrow the schema value; flatten them to text.
        let compiled = JSONSchema::compile(&schema)
            .map_err(|err| anyhow!("compiling {label} schema: {err}"))?;
        Ok(Self {
            schema_version,
            compiled,
        })
    }

    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    /// Validate one record, joining every violation into a single message.
    pub fn validate(&self, record: &Value) -> Result<(), String> {
        if let Err(errors) = self.compiled.validate(record) {
            let details = errors
                .map(|err| {
                    let path = err.instance_path.to_string();
                    if path.is_empty() {
                        err.to_string()
                    } else {
                        format!("{path}: {err}")
                    }
                })
                .collect::<Vec<_>>()
                .join("; ");
            return Err(details);
        }
        Ok(())
    }
}

fn extract_schema_version(schema: &Value, pointer: &str) -> Option<String> {
    let version = schema.pointer(pointer).and_then(Value::as_str)?;
    if version
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        Some(version.to_string())
    } else {
        None
    }
}
