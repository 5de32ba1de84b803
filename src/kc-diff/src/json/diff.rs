use serde_json::Value;

use super::JsonDiff;
use super::PatchObject;
use crate::Changes;
use crate::Diff;
use crate::DiffError;

impl Changes for Value {
    type Replace = Value;
    type Patch = PatchObject;

    fn diff(&self, new: &Self) -> Result<JsonDiff, DiffError> {
        if *self == *new {
            return Ok(Diff::None);
        }
        match (self, new) {
            (_, Value::Null) => Ok(Diff::Replace(Value::Null)),
            (Value::Null, _) => Ok(Diff::Replace(new.clone())),
            (Value::Object(old_val), Value::Object(new_val)) => {
                Ok(Diff::Patch(PatchObject::diff(old_val, new_val)?))
            }
            // object can only be patched by another object
            (Value::Object(_), _) | (_, Value::Object(_)) => Err(DiffError::DiffValue),
            _ => Ok(Diff::Replace(new.clone())),
        }
    }
}
