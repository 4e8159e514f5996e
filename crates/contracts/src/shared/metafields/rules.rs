//! Typed validation rules for metafield definitions
//!
//! Definitions travel over the wire with an opaque `validationsJson` blob of
//! the shape `{required?, min?, max?, regex?, enumValues?}`. The meaning of
//! `min`/`max` depends on the value type, so the blob is parsed into a
//! [`Constraint`] keyed by [`MetafieldValueType`] as soon as it enters the
//! system. Everything that can be checked about the rules themselves (regex
//! syntax, bound formats, enum values) is checked here, at save time.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::error::MetafieldError;
use crate::enums::MetafieldValueType;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Compiled regular expression that remembers its source text
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn compile(source: &str) -> Result<Self, MetafieldError> {
        let regex = Regex::new(source).map_err(|e| {
            MetafieldError::InvalidDefinition(format!("regex `{}` does not compile: {}", source, e))
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Type-specific part of the rules
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// string, text, json: bounds count characters
    Text {
        min_length: Option<usize>,
        max_length: Option<usize>,
        pattern: Option<Pattern>,
    },
    Number {
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Inclusive calendar bounds
    Date {
        min: Option<NaiveDate>,
        max: Option<NaiveDate>,
    },
    /// Inclusive bounds, compared as naive UTC
    DateTime {
        min: Option<NaiveDateTime>,
        max: Option<NaiveDateTime>,
    },
    Enum {
        values: Vec<String>,
    },
    Boolean,
    Color,
}

/// Validation rules of one definition
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRules {
    pub required: bool,
    pub constraint: Constraint,
}

/// Loose wire shape of `validationsJson`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawValidations {
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub min: Option<Value>,
    #[serde(default)]
    pub max: Option<Value>,
    #[serde(default)]
    pub regex: Option<String>,
    #[serde(default, alias = "enum_values")]
    pub enum_values: Option<Vec<String>>,
}

impl ValidationRules {
    /// Rules with no constraints at all
    pub fn unconstrained(value_type: MetafieldValueType) -> Self {
        let constraint = match value_type {
            MetafieldValueType::String | MetafieldValueType::Text | MetafieldValueType::Json => {
                Constraint::Text {
                    min_length: None,
                    max_length: None,
                    pattern: None,
                }
            }
            MetafieldValueType::Number => Constraint::Number { min: None, max: None },
            MetafieldValueType::Date => Constraint::Date { min: None, max: None },
            MetafieldValueType::DateTime => Constraint::DateTime { min: None, max: None },
            MetafieldValueType::Enum => Constraint::Enum { values: Vec::new() },
            MetafieldValueType::Boolean => Constraint::Boolean,
            MetafieldValueType::Color => Constraint::Color,
        };
        Self {
            required: false,
            constraint,
        }
    }

    /// Parse the opaque `validationsJson` blob for the given value type.
    /// A blank blob means "no constraints".
    pub fn parse(value_type: MetafieldValueType, blob: &str) -> Result<Self, MetafieldError> {
        if blob.trim().is_empty() {
            return Self::from_raw(value_type, RawValidations::default());
        }
        let raw: RawValidations = serde_json::from_str(blob).map_err(|e| {
            MetafieldError::InvalidDefinition(format!("validations are not valid JSON: {}", e))
        })?;
        Self::from_raw(value_type, raw)
    }

    pub fn from_raw(
        value_type: MetafieldValueType,
        raw: RawValidations,
    ) -> Result<Self, MetafieldError> {
        let required = raw.required.unwrap_or(false);
        let constraint = match value_type {
            MetafieldValueType::String | MetafieldValueType::Text | MetafieldValueType::Json => {
                let min_length = length_bound("min", raw.min.as_ref())?;
                let max_length = length_bound("max", raw.max.as_ref())?;
                check_order(min_length, max_length)?;
                let pattern = match raw.regex.as_deref().map(str::trim) {
                    Some(src) if !src.is_empty() => Some(Pattern::compile(src)?),
                    _ => None,
                };
                Constraint::Text {
                    min_length,
                    max_length,
                    pattern,
                }
            }
            MetafieldValueType::Number => {
                let min = number_bound("min", raw.min.as_ref())?;
                let max = number_bound("max", raw.max.as_ref())?;
                check_order(min, max)?;
                Constraint::Number { min, max }
            }
            MetafieldValueType::Date => {
                let min = calendar_bound("min", raw.min.as_ref(), parse_date)?;
                let max = calendar_bound("max", raw.max.as_ref(), parse_date)?;
                check_order(min, max)?;
                Constraint::Date { min, max }
            }
            MetafieldValueType::DateTime => {
                let min = calendar_bound("min", raw.min.as_ref(), parse_date_time)?;
                let max = calendar_bound("max", raw.max.as_ref(), parse_date_time)?;
                check_order(min, max)?;
                Constraint::DateTime { min, max }
            }
            MetafieldValueType::Enum => {
                let mut values: Vec<String> = Vec::new();
                for value in raw.enum_values.unwrap_or_default() {
                    let value = value.trim().to_string();
                    if !value.is_empty() && !values.contains(&value) {
                        values.push(value);
                    }
                }
                if values.is_empty() {
                    return Err(MetafieldError::InvalidDefinition(
                        "enum metafields need at least one allowed value".into(),
                    ));
                }
                Constraint::Enum { values }
            }
            MetafieldValueType::Boolean => Constraint::Boolean,
            MetafieldValueType::Color => Constraint::Color,
        };
        Ok(Self {
            required,
            constraint,
        })
    }

    /// Canonical `validationsJson` blob; only the keys that carry meaning
    /// for the constraint are written.
    pub fn to_json(&self) -> String {
        let mut blob = Map::new();
        blob.insert("required".into(), Value::Bool(self.required));
        match &self.constraint {
            Constraint::Text {
                min_length,
                max_length,
                pattern,
            } => {
                if let Some(min) = min_length {
                    blob.insert("min".into(), json!(min));
                }
                if let Some(max) = max_length {
                    blob.insert("max".into(), json!(max));
                }
                if let Some(pattern) = pattern {
                    blob.insert("regex".into(), json!(pattern.as_str()));
                }
            }
            Constraint::Number { min, max } => {
                if let Some(min) = min {
                    blob.insert("min".into(), json!(min));
                }
                if let Some(max) = max {
                    blob.insert("max".into(), json!(max));
                }
            }
            Constraint::Date { min, max } => {
                if let Some(min) = min {
                    blob.insert("min".into(), json!(min.format(DATE_FORMAT).to_string()));
                }
                if let Some(max) = max {
                    blob.insert("max".into(), json!(max.format(DATE_FORMAT).to_string()));
                }
            }
            Constraint::DateTime { min, max } => {
                if let Some(min) = min {
                    blob.insert("min".into(), json!(format_date_time(min)));
                }
                if let Some(max) = max {
                    blob.insert("max".into(), json!(format_date_time(max)));
                }
            }
            Constraint::Enum { values } => {
                blob.insert("enumValues".into(), json!(values));
            }
            Constraint::Boolean | Constraint::Color => {}
        }
        Value::Object(blob).to_string()
    }

    /// Enum members, empty for every other constraint
    pub fn enum_values(&self) -> &[String] {
        match &self.constraint {
            Constraint::Enum { values } => values,
            _ => &[],
        }
    }
}

/// Calendar date without time of day. Date-time strings are accepted and
/// truncated to their date in the offset they were written in.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(|dt| dt.date())
        })
}

/// Full date-time. RFC 3339 offsets are normalised to UTC; a bare date means
/// midnight.
pub fn parse_date_time(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Fractional seconds are written only when present
pub(crate) fn format_date_time(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

fn check_order<T: PartialOrd>(min: Option<T>, max: Option<T>) -> Result<(), MetafieldError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(MetafieldError::InvalidDefinition(
            "min must not be greater than max".into(),
        )),
        _ => Ok(()),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn number_bound(name: &str, value: Option<&Value>) -> Result<Option<f64>, MetafieldError> {
    let Some(value) = value.filter(|v| !is_blank(v)) else {
        return Ok(None);
    };
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() => Ok(Some(n)),
        _ => Err(MetafieldError::InvalidDefinition(format!(
            "{} must be a finite number, got {}",
            name, value
        ))),
    }
}

fn length_bound(name: &str, value: Option<&Value>) -> Result<Option<usize>, MetafieldError> {
    let Some(value) = value.filter(|v| !is_blank(v)) else {
        return Ok(None);
    };
    let length = match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    length
        .and_then(|n| usize::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| {
            MetafieldError::InvalidDefinition(format!(
                "{} length must be a non-negative integer, got {}",
                name, value
            ))
        })
}

fn calendar_bound<T>(
    name: &str,
    value: Option<&Value>,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, MetafieldError> {
    let Some(value) = value.filter(|v| !is_blank(v)) else {
        return Ok(None);
    };
    value
        .as_str()
        .and_then(parse)
        .map(Some)
        .ok_or_else(|| {
            MetafieldError::InvalidDefinition(format!("{} must be a valid date, got {}", name, value))
        })
}
