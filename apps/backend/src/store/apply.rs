//! Write application shared by every store implementation.

use serde_json::{Map, Value};

use super::batch::{FieldOp, Precondition, Write, WriteKind};
use super::path::{DocPath, FieldPath};
use super::{Document, StoreError};

/// Committed state of one document as seen by a write: `(version, data)`.
pub type Current<'a> = Option<(u64, &'a Document)>;

pub fn check_precondition(
    path: &DocPath,
    current: Option<u64>,
    precondition: Precondition,
) -> Result<(), StoreError> {
    match (precondition, current) {
        (Precondition::None, _) => Ok(()),
        (Precondition::Exists, Some(_)) => Ok(()),
        (Precondition::Exists, None) => Err(StoreError::precondition(path, "document missing")),
        (Precondition::Missing, None) => Ok(()),
        (Precondition::Missing, Some(_)) => {
            Err(StoreError::precondition(path, "document already exists"))
        }
        (Precondition::Version(expected), Some(actual)) if expected == actual => Ok(()),
        (Precondition::Version(expected), Some(actual)) => Err(StoreError::precondition(
            path,
            format!("expected version {expected}, found {actual}"),
        )),
        (Precondition::Version(expected), None) => Err(StoreError::precondition(
            path,
            format!("expected version {expected}, document missing"),
        )),
    }
}

/// Resulting document after `write`, or `None` when the write deletes it.
pub fn apply_write(current: Current<'_>, write: &Write) -> Result<Option<Document>, StoreError> {
    check_precondition(&write.path, current.map(|(v, _)| v), write.precondition)?;

    match &write.kind {
        WriteKind::Set(data) => Ok(Some(data.clone())),
        WriteKind::Upsert(ops) => {
            let mut doc = current.map(|(_, d)| d.clone()).unwrap_or_default();
            apply_ops(&mut doc, ops);
            Ok(Some(doc))
        }
        WriteKind::Update(ops) => {
            let Some((_, existing)) = current else {
                return Err(StoreError::NotFound(write.path.to_string()));
            };
            let mut doc = existing.clone();
            apply_ops(&mut doc, ops);
            Ok(Some(doc))
        }
        WriteKind::Delete => Ok(None),
    }
}

pub fn apply_ops(doc: &mut Document, ops: &[FieldOp]) {
    for op in ops {
        apply_op(doc, op);
    }
}

fn apply_op(doc: &mut Document, op: &FieldOp) {
    match op {
        FieldOp::Put(path, value) => {
            if let Some((parent, leaf)) = parent_mut(doc, path, true) {
                parent.insert(leaf.to_string(), value.clone());
            }
        }
        FieldOp::Remove(path) => {
            if let Some((parent, leaf)) = parent_mut(doc, path, false) {
                parent.remove(leaf);
            }
        }
        FieldOp::Increment(path, by) => {
            if let Some((parent, leaf)) = parent_mut(doc, path, true) {
                let next = match parent.get(leaf) {
                    Some(Value::Number(n)) => match n.as_i64() {
                        Some(i) => Value::from(i.saturating_add(*by)),
                        None => Value::from(n.as_f64().unwrap_or(0.0) + *by as f64),
                    },
                    _ => Value::from(*by),
                };
                parent.insert(leaf.to_string(), next);
            }
        }
        FieldOp::ArrayUnion(path, values) => {
            if let Some((parent, leaf)) = parent_mut(doc, path, true) {
                let mut items = match parent.remove(leaf) {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                };
                for value in values {
                    if !items.contains(value) {
                        items.push(value.clone());
                    }
                }
                parent.insert(leaf.to_string(), Value::Array(items));
            }
        }
        FieldOp::ArrayRemove(path, values) => {
            if let Some((parent, leaf)) = parent_mut(doc, path, true) {
                let items = match parent.remove(leaf) {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                };
                let kept = items.into_iter().filter(|v| !values.contains(v)).collect();
                parent.insert(leaf.to_string(), Value::Array(kept));
            }
        }
    }
}

/// Walk to the map holding the last segment of `path`.
///
/// With `create`, missing or non-map intermediates are replaced by empty maps.
/// Without it, a missing intermediate yields `None`.
fn parent_mut<'a>(
    doc: &'a mut Document,
    path: &'a FieldPath,
    create: bool,
) -> Option<(&'a mut Map<String, Value>, &'a str)> {
    let (leaf, parents) = path.segments().split_last()?;
    let mut cursor = doc;
    for segment in parents {
        if create {
            let entry = cursor
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            cursor = entry.as_object_mut()?;
        } else {
            cursor = cursor.get_mut(segment)?.as_object_mut()?;
        }
    }
    Some((cursor, leaf.as_str()))
}

/// Read a nested field.
pub fn field<'a>(doc: &'a Document, path: &FieldPath) -> Option<&'a Value> {
    let (first, rest) = path.segments().split_first()?;
    let mut value = doc.get(first)?;
    for segment in rest {
        value = value.as_object()?.get(segment)?;
    }
    Some(value)
}
