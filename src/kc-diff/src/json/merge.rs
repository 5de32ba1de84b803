use serde_json::Value;
use tracing::trace;

/// apply JSON merge patch (RFC 7386) to target in place
pub fn apply_merge_patch(target: &mut Value, patch: &Value) {
    let patch_map = match patch {
        Value::Object(map) => map,
        _ => {
            *target = patch.clone();
            return;
        }
    };

    if !target.is_object() {
        *target = Value::Object(Default::default());
    }

    if let Value::Object(target_map) = target {
        for (key, value) in patch_map.iter() {
            if value.is_null() {
                trace!("merge patch: removing {}", key);
                target_map.remove(key);
            } else {
                let entry = target_map.entry(key.clone()).or_insert(Value::Null);
                apply_merge_patch(entry, value);
            }
        }
    }
}
