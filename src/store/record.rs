use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One stored item: a field-name to field-value mapping.
///
/// BTreeMap keeps field iteration deterministic, which fixes the order
/// constraint checks run in.
pub type Record = BTreeMap<String, Field>;

/// A field value, either a plain JSON value or a value wrapped with
/// validation metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Field {
    Constrained(ConstrainedField),
    Plain(Value),
}

/// A value carrying optional `type` and `unique` constraints.
///
/// `deny_unknown_fields` keeps arbitrary JSON objects that happen to contain
/// a `value` key plus anything else deserializing as `Field::Plain`, so no
/// user data is dropped on a rewrite.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConstrainedField {
    pub value: Value,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub dtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
}

impl Field {
    /// The underlying value, unwrapped from constraint metadata if present.
    pub fn value(&self) -> &Value {
        match self {
            Field::Constrained(c) => &c.value,
            Field::Plain(v) => v,
        }
    }
}

/// Runtime type name of a JSON value, as matched against a constrained
/// field's declared `type`.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Stamp the four creation-time fields onto a record.
///
/// The updated pair duplicates the created pair; no operation restamps them
/// later (there is no update operation).
pub fn stamp_created(record: &mut Record) {
    let now = Utc::now();
    let human = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    let millis = now.timestamp_millis();

    record.insert("createdAt".to_string(), Field::Plain(Value::from(human.clone())));
    record.insert("createdTimestamp".to_string(), Field::Plain(Value::from(millis)));
    record.insert("updatedAt".to_string(), Field::Plain(Value::from(human)));
    record.insert("updatedTimestamp".to_string(), Field::Plain(Value::from(millis)));
}
