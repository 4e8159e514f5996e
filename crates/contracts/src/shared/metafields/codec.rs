//! Canonical JSON encoding of metafield values
//!
//! Stored values are JSON text (`valueJson`):
//! - boolean definitions store `true` / `false`;
//! - list definitions store an array of strings;
//! - every other scalar is stored as a JSON string, numbers and dates included.
//!
//! Decoding is tolerant: text that is not valid JSON is kept as
//! [`DecodedValue::Legacy`] so that salvaged data can be told apart from
//! clean data.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::MetafieldError;
use super::validation;
use crate::domain::a025_metafield_definition::aggregate::MetafieldDefinition;
use crate::enums::MetafieldValueType;

/// Value as seen by editors after reading `valueJson`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum DecodedValue {
    Empty,
    Text(String),
    List(Vec<String>),
    Boolean(bool),
    /// Stored text that does not parse as JSON, kept verbatim
    Legacy(String),
}

impl DecodedValue {
    pub fn is_legacy(&self) -> bool {
        matches!(self, DecodedValue::Legacy(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DecodedValue::Text(s) | DecodedValue::Legacy(s) => Some(s),
            _ => None,
        }
    }

    /// Editor input for this value, suitable for `validate`/`encode`
    pub fn to_raw(&self) -> Value {
        match self {
            DecodedValue::Empty => Value::Null,
            DecodedValue::Text(s) | DecodedValue::Legacy(s) => Value::String(s.clone()),
            DecodedValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            DecodedValue::Boolean(b) => Value::Bool(*b),
        }
    }
}

/// Encode a raw editor value into canonical `valueJson`.
///
/// Callers validate first; [`validate_and_encode`] does both.
pub fn encode(definition: &MetafieldDefinition, raw: &Value) -> String {
    if definition.value_type == MetafieldValueType::Boolean {
        return Value::Bool(coerce_bool(raw)).to_string();
    }

    if definition.is_list {
        let items = match list_elements(raw) {
            Some(items) => items,
            None if validation::is_empty(raw) => Vec::new(),
            None => vec![raw.clone()],
        };
        let strings = items.iter().map(|v| Value::String(stringify(v))).collect();
        return Value::Array(strings).to_string();
    }

    if validation::is_empty(raw) {
        return Value::String(String::new()).to_string();
    }
    Value::String(stringify(raw)).to_string()
}

/// Decode stored `valueJson`
pub fn decode(value_json: &str) -> DecodedValue {
    if value_json.trim().is_empty() {
        return DecodedValue::Empty;
    }
    match serde_json::from_str::<Value>(value_json) {
        Ok(Value::Null) => DecodedValue::Empty,
        Ok(Value::Bool(b)) => DecodedValue::Boolean(b),
        Ok(Value::String(s)) => DecodedValue::Text(s),
        Ok(Value::Array(items)) => DecodedValue::List(items.iter().map(stringify).collect()),
        Ok(Value::Number(n)) => DecodedValue::Text(n.to_string()),
        Ok(object @ Value::Object(_)) => DecodedValue::Text(object.to_string()),
        Err(_) => DecodedValue::Legacy(value_json.to_string()),
    }
}

/// Validate, then encode. The only path that should feed the value store.
pub fn validate_and_encode(
    definition: &MetafieldDefinition,
    raw: &Value,
) -> Result<String, MetafieldError> {
    validation::validate(definition, raw)?;
    Ok(encode(definition, raw))
}

/// Elements of a list input: an in-memory array, or a string holding a
/// JSON array. `None` for anything else.
pub fn list_elements(raw: &Value) -> Option<Vec<Value>> {
    match raw {
        Value::Array(items) => Some(items.clone()),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

/// Text form of a single element
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn coerce_bool(raw: &Value) -> bool {
    match raw {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        ),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}
