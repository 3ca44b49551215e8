use serde_json::{Map, Value};

/// Copies a map entry-by-entry so providers never share the caller's object.
/// Mirrors the JS `clone` helper used before every fan-out dispatch.
pub fn shallow_clone(map: &Map<String, Value>) -> Map<String, Value> {
    let mut clone = Map::new();
    for (key, value) in map.iter() {
        clone.insert(key.clone(), value.clone());
    }
    clone
}
