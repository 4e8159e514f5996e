//! Validation of candidate values against a metafield definition
//!
//! Checks run in a fixed order, and the first failure wins:
//! 1. required / emptiness
//! 2. cardinality (list inputs must be JSON arrays)
//! 3. per element: type and format
//! 4. per element: range, pattern or membership
//!
//! List elements are checked in their original order; the first failing
//! element is reported.

use chrono::NaiveDate;
use serde_json::Value;

use super::codec;
use super::error::MetafieldError;
use super::rules::{self, Constraint};
use crate::domain::a025_metafield_definition::aggregate::MetafieldDefinition;
use crate::enums::MetafieldValueType;

/// `null`, a whitespace-only string or a zero-length array
pub fn is_empty(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Check `raw` against the definition's type, cardinality and rules
pub fn validate(definition: &MetafieldDefinition, raw: &Value) -> Result<(), MetafieldError> {
    let label = definition.label();
    let required = definition.validation.required;

    if is_empty(raw) {
        if required {
            return Err(required_error(&label));
        }
        return Ok(());
    }

    if definition.value_type == MetafieldValueType::Boolean {
        return Ok(());
    }

    if definition.is_list {
        let elements = codec::list_elements(raw).ok_or_else(|| {
            MetafieldError::MalformedInput(format!(
                "{}: value must be a JSON array of {}",
                label, definition.value_type
            ))
        })?;
        if elements.is_empty() && required {
            return Err(required_error(&label));
        }
        for (index, element) in elements.iter().enumerate() {
            check_element(&definition.validation.constraint, element)
                .map_err(|problem| {
                    MetafieldError::Validation(format!("{}[{}]: {}", label, index, problem))
                })?;
        }
        return Ok(());
    }

    check_element(&definition.validation.constraint, raw)
        .map_err(|problem| MetafieldError::Validation(format!("{}: {}", label, problem)))
}

fn required_error(label: &str) -> MetafieldError {
    MetafieldError::Validation(format!("{}: value is required", label))
}

/// Returns the problem description without the field label
fn check_element(constraint: &Constraint, element: &Value) -> Result<(), String> {
    match constraint {
        Constraint::Number { min, max } => {
            let number = coerce_number(element).ok_or("must be a number")?;
            if let Some(min) = min {
                if number < *min {
                    return Err(format!("must be at least {}", min));
                }
            }
            if let Some(max) = max {
                if number > *max {
                    return Err(format!("must be at most {}", max));
                }
            }
            Ok(())
        }
        Constraint::Date { min, max } => {
            let text = codec::stringify(element);
            let date = rules::parse_date(&text).ok_or("must be a valid date")?;
            check_date_range(date, *min, *max)
        }
        Constraint::DateTime { min, max } => {
            let text = codec::stringify(element);
            let value = rules::parse_date_time(&text).ok_or("must be a valid date")?;
            if let Some(min) = min {
                if value < *min {
                    return Err(format!("must be on or after {}", rules::format_date_time(min)));
                }
            }
            if let Some(max) = max {
                if value > *max {
                    return Err(format!("must be on or before {}", rules::format_date_time(max)));
                }
            }
            Ok(())
        }
        Constraint::Text {
            min_length,
            max_length,
            pattern,
        } => {
            let text = codec::stringify(element);
            let length = text.chars().count();
            if let Some(min) = min_length {
                if length < *min {
                    return Err(format!("must be at least {} characters", min));
                }
            }
            if let Some(max) = max_length {
                if length > *max {
                    return Err(format!("must be at most {} characters", max));
                }
            }
            if let Some(pattern) = pattern {
                if !pattern.is_match(&text) {
                    return Err(format!("must match the pattern {}", pattern.as_str()));
                }
            }
            Ok(())
        }
        Constraint::Enum { values } => {
            let text = codec::stringify(element);
            if values.iter().any(|allowed| *allowed == text) {
                Ok(())
            } else {
                Err(format!("must be one of {}", values.join(", ")))
            }
        }
        Constraint::Color => {
            let text = codec::stringify(element);
            if is_hex_color(text.trim()) {
                Ok(())
            } else {
                Err("must be a hex color like #1a2b3c".to_string())
            }
        }
        Constraint::Boolean => Ok(()),
    }
}

fn check_date_range(
    date: NaiveDate,
    min: Option<NaiveDate>,
    max: Option<NaiveDate>,
) -> Result<(), String> {
    if let Some(min) = min {
        if date < min {
            return Err(format!("must be on or after {}", min));
        }
    }
    if let Some(max) = max {
        if date > max {
            return Err(format!("must be on or before {}", max));
        }
    }
    Ok(())
}

fn coerce_number(element: &Value) -> Option<f64> {
    let number = match element {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) if !s.trim().is_empty() => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn is_hex_color(text: &str) -> bool {
    match text.strip_prefix('#') {
        Some(hex) => {
            matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}
