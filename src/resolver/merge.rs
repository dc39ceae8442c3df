//! Deep later-wins merge
//!
//! The merge contract for overlay layers: nested JSON objects merge
//! recursively, everything else (scalars, arrays) replaces outright.

use crate::layers::OverlayLayer;

use serde_json::Value;

/// Merges `overlay` into `base`
///
/// Object-into-object merges key-wise and recurses; any other combination
/// replaces the base value.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(slot) => deep_merge(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Merges overlay layers in precedence order; later layers win
pub fn merge_layers<I>(layers: I) -> OverlayLayer
where
    I: IntoIterator<Item = OverlayLayer>,
{
    let mut merged = OverlayLayer::new();
    for layer in layers {
        for (key, value) in layer {
            match merged.get_mut(&key) {
                Some(slot) => deep_merge(slot, value),
                None => {
                    merged.insert(key, value);
                }
            }
        }
    }
    merged
}
