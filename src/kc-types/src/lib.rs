mod object;
mod resource;
pub mod endpoint;
pub mod options;
pub mod storage;

pub use self::object::{ApiList, ApiObject, ListMeta, ObjectMeta};
pub use self::resource::{Resource, ResourceKind};
