use serde::Deserialize;
use serde::Serialize;

use crate::{Resource, ResourceKind};

/// storage class fields as stored in the cluster
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageClassResource {
    pub provisioner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_volume_expansion: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reclaim_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_binding_mode: Option<String>,
}

impl Resource for StorageClassResource {
    const KIND: ResourceKind = ResourceKind {
        group: "storage.k8s.io",
        version: "v1",
        kind: "StorageClass",
        plural: "storageclasses",
    };
}
