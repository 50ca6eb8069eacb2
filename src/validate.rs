// Shape checks between raw JSON and typed catalog records
use crate::diagnostics::Diagnostics;
use crate::model::{Badge, Course, RawDocument, SchemaError};
use serde_json::{Map, Value};

const COURSE_CONTAINERS: &[&str] = &["courses"];
const BADGE_CONTAINERS: &[&str] = &["data", "badges"];

const COURSE_NAME_KEYS: &[&str] = &["name", "course_name"];
const COURSE_DESCRIPTION_KEYS: &[&str] = &["description", "course_description"];
const BADGE_NAME_KEYS: &[&str] = &["name", "badge_name"];
const BADGE_DESCRIPTION_KEYS: &[&str] = &["description", "badge_description"];

/// Accepts a bare array or an object with a `courses` key.
pub fn extract_courses(doc: &RawDocument, diagnostics: &dyn Diagnostics) -> Result<Vec<Course>, SchemaError> {
    let records = container(doc, COURSE_CONTAINERS)?;
    let mut courses = Vec::with_capacity(records.len());
    for (index, value) in records.iter().enumerate() {
        let record = as_record(index, value)?;
        match identity(record, COURSE_NAME_KEYS) {
            Some(name) => courses.push(Course {
                name,
                description: text(record, COURSE_DESCRIPTION_KEYS),
            }),
            None => diagnostics.warning(&format!(
                "⚠️ Skipping course #{}: missing or empty 'name'",
                index
            )),
        }
    }
    Ok(courses)
}

/// Accepts a bare array or an object with a `data` or `badges` key.
pub fn extract_badges(doc: &RawDocument, diagnostics: &dyn Diagnostics) -> Result<Vec<Badge>, SchemaError> {
    let records = container(doc, BADGE_CONTAINERS)?;
    let mut badges = Vec::with_capacity(records.len());
    for (index, value) in records.iter().enumerate() {
        let record = as_record(index, value)?;
        match identity(record, BADGE_NAME_KEYS) {
            Some(name) => badges.push(Badge {
                name,
                description: text(record, BADGE_DESCRIPTION_KEYS),
            }),
            None => diagnostics.warning(&format!(
                "⚠️ Skipping badge #{}: missing or empty 'name'",
                index
            )),
        }
    }
    Ok(badges)
}

fn container<'a>(doc: &'a RawDocument, keys: &[&'static str]) -> Result<&'a Vec<Value>, SchemaError> {
    match doc {
        Value::Array(items) => Ok(items),
        Value::Object(map) => {
            let (key, value) = keys
                .iter()
                .find_map(|k| map.get(*k).map(|v| (*k, v)))
                .ok_or_else(|| SchemaError::MissingContainerKey { expected: keys.to_vec() })?;
            value.as_array().ok_or_else(|| SchemaError::NotAnArray {
                key: key.to_string(),
                found: kind(value),
            })
        }
        other => Err(SchemaError::NotAContainer { found: kind(other) }),
    }
}

fn as_record(index: usize, value: &Value) -> Result<&Map<String, Value>, SchemaError> {
    value.as_object().ok_or(SchemaError::NotARecord {
        index,
        found: kind(value),
    })
}

fn identity(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| record.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(str::to_string)
}

fn text(record: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| record.get(*k).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
