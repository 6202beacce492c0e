//! Recursive merge for catalog metadata updates
//!
//! Objects are merged key by key, recursing into nested objects. Every other
//! value (scalars, arrays, null) in the update replaces what was there, so
//! the later value wins at each leaf.

use serde_json::{Map, Value};

/// Merge `update` into `target` in place
pub fn deep_merge(target: &mut Value, update: Value) {
    match (target, update) {
        (Value::Object(target), Value::Object(update)) => merge_objects(target, update),
        (target, update) => *target = update,
    }
}

/// Merge the members of `update` into `target` in place
pub fn merge_objects(target: &mut Map<String, Value>, update: Map<String, Value>) {
    for (key, value) in update {
        match target.get_mut(&key) {
            Some(existing) => deep_merge(existing, value),
            None => {
                target.insert(key, value);
            }
        }
    }
}
