mod json;

use std::fmt;

pub use json::apply_merge_patch;
pub use json::JsonDiff;
pub use json::PatchObject;

pub trait Changes {
    type Replace;
    type Patch;

    fn diff(&self, new: &Self) -> Result<Diff<Self::Replace, Self::Patch>, DiffError>;
}

#[derive(Debug)]
pub enum DiffError {
    DiffValue, // json values are different
}

impl fmt::Display for DiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DiffValue => write!(f, "JSON value types are different"),
        }
    }
}

impl std::error::Error for DiffError {}

#[derive(Debug)]
pub enum Diff<R, P> {
    None,
    Delete,
    Patch(P),   // for objects
    Replace(R), // primitives and lists, lists are always replaced as a whole
}

impl<R, P> Diff<R, P> {
    pub fn is_none(&self) -> bool {
        matches!(self, Diff::None)
    }

    pub fn is_replace(&self) -> bool {
        matches!(self, Diff::Replace(_))
    }

    pub fn is_patch(&self) -> bool {
        matches!(self, Diff::Patch(_))
    }

    pub fn as_replace_ref(&self) -> Option<&R> {
        match self {
            Diff::Replace(ref val) => Some(val),
            _ => None,
        }
    }

    pub fn as_patch_ref(&self) -> Option<&P> {
        match self {
            Diff::Patch(ref val) => Some(val),
            _ => None,
        }
    }
}
