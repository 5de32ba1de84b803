mod diff;
mod merge;

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::Serialize;
use serde::Serializer;
use serde_json::Map;
use serde_json::Value;

use crate::Changes;
use crate::Diff;
use crate::DiffError;

pub use merge::apply_merge_patch;

pub type JsonDiff = Diff<Value, PatchObject>;

/// changes to a JSON object, keyed by property.
/// serializes as a JSON merge patch (RFC 7386)
#[derive(Debug, Default)]
pub struct PatchObject(BTreeMap<String, JsonDiff>);

impl PatchObject {
    // diff two objects, unchanged properties are left out
    fn diff(old: &Map<String, Value>, new: &Map<String, Value>) -> Result<Self, DiffError> {
        let mut changes = BTreeMap::new();

        for (key, new_val) in new.iter() {
            match old.get(key) {
                Some(old_val) => {
                    let diff = old_val.diff(new_val)?;
                    if !diff.is_none() {
                        changes.insert(key.clone(), diff);
                    }
                }
                None => {
                    changes.insert(key.clone(), Diff::Replace(new_val.clone()));
                }
            }
        }

        for key in old.keys() {
            if !new.contains_key(key) {
                changes.insert(key.clone(), Diff::Delete);
            }
        }

        Ok(Self(changes))
    }

    pub fn get_inner_ref(&self) -> &BTreeMap<String, JsonDiff> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for PatchObject {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, diff) in self.0.iter() {
            match diff {
                Diff::None => {}
                Diff::Delete => map.serialize_entry(key, &Value::Null)?,
                Diff::Patch(patch) => map.serialize_entry(key, patch)?,
                Diff::Replace(value) => map.serialize_entry(key, value)?,
            }
        }
        map.end()
    }
}
