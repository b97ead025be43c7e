// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON object merge strategies.
//!
//! The router merges `status` shallowly (see [`StatusMessage::merge`]). The
//! recursive variants here serve consumers that keep their own copy of a
//! nested structure, such as a modem list being edited in a form.
//!
//! [`StatusMessage::merge`]: crate::messages::StatusMessage::merge

use serde_json::{Map, Value};

/// Recursively merge `source` into `target`.
///
/// Object values merge key by key at every depth; any other value (arrays
/// included) overwrites. A nested object lands on a missing or falsy key
/// (`null`, `false`, `0`, `""`) as a fresh object, but a truthy non-object
/// such as `true` or an array is kept and the nested source skipped. A
/// non-object `target` or `source` leaves `target` unchanged.
pub fn deep_merge(target: &mut Value, source: &Value) {
    if let (Value::Object(target), Value::Object(source)) = (target, source) {
        merge_objects(target, source);
    }
}

/// Merge a fresh modem list into a previous one.
///
/// Top-level entries missing from `source` are removed (the modem was
/// unplugged); everything else is deep merged.
pub fn merge_modems(target: &mut Value, source: &Value) {
    if let (Value::Object(target), Value::Object(source)) = (target, source) {
        target.retain(|key, _| source.contains_key(key));
        merge_objects(target, source);
    }
}

fn merge_objects(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        match value {
            Value::Object(nested) => {
                let slot = target.entry(key.clone()).or_insert(Value::Null);
                if is_falsy(slot) {
                    *slot = Value::Object(Map::new());
                }
                if let Value::Object(slot) = slot {
                    merge_objects(slot, nested);
                }
            }
            other => {
                target.insert(key.clone(), other.clone());
            }
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;
