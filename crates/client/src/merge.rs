//! Accumulates paginated list responses.
//!
//! Merge policy, applied recursively:
//! - object + object: merged key by key; keys only in the later page are added.
//! - array + array: the later page's items are appended.
//! - anything else: the later page's value wins.
//!
//! So `data` arrays grow across pages while scalar metadata reflects the
//! last page fetched.

use serde_json::Value;

/// Merge `incoming` into `base` in place.
pub fn merge_recursive(base: &mut Value, incoming: Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(incoming_map)) => {
            for (key, value) in incoming_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_recursive(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(base_items), Value::Array(incoming_items)) => {
            base_items.extend(incoming_items);
        }
        (slot, value) => *slot = value,
    }
}
