use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// group, version and names of a cluster resource
#[derive(Debug, PartialEq, Eq)]
pub struct ResourceKind {
    pub group: &'static str,
    pub version: &'static str,
    pub kind: &'static str,
    pub plural: &'static str,
}

impl ResourceKind {
    /// core resources have no group in their api version
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.to_owned()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// path of the resource collection below the cluster api root
    pub fn collection_path(&self) -> String {
        if self.group.is_empty() {
            format!("api/{}/{}", self.version, self.plural)
        } else {
            format!("apis/{}/{}/{}", self.group, self.version, self.plural)
        }
    }
}

/// Top level fields of a cluster resource, next to its metadata.
/// Resources are always cluster scoped here.
pub trait Resource:
    Sized + Debug + Clone + Default + Serialize + DeserializeOwned + Send + Sync
{
    const KIND: ResourceKind;

    fn api_version() -> String {
        Self::KIND.api_version()
    }

    fn kind() -> String {
        Self::KIND.kind.to_owned()
    }
}
