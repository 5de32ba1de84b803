use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use tracing::trace;

use kc_diff::{Changes, Diff};
use kc_types::endpoint::EndpointId;
use kc_types::options::ListOptions;
use kc_types::storage::{
    AccessMode, StorageClass, StorageClassResource, ACCESS_MODES_ANNOTATION,
};
use kc_types::ApiObject;

use crate::{ClientError, GatewayError, SharedClient, StorageTransport};

const LIST_FAILED: &str = "Unable to retrieve storage classes";
const PATCH_FAILED: &str = "Unable to patch storage class";

/// map storage class as returned by API into console model.
/// available access modes are left empty
pub fn api_to_storage_class(item: ApiObject<StorageClassResource>) -> StorageClass {
    let access_modes = item
        .metadata
        .annotation(ACCESS_MODES_ANNOTATION)
        .map(AccessMode::parse_list)
        .unwrap_or_default();

    StorageClass {
        name: item.metadata.name,
        provisioner: item.resource.provisioner,
        allow_volume_expansion: item.resource.allow_volume_expansion.unwrap_or(false),
        access_modes,
        ..Default::default()
    }
}

/// fields of a storage class the console edits, laid out as on the wire
#[derive(Serialize, Debug)]
struct EditableStorageClass {
    metadata: EditableMeta,
    #[serde(flatten)]
    resource: StorageClassResource,
}

// annotations the console owns; null value removes the annotation when patched
#[derive(Serialize, Debug)]
struct EditableMeta {
    name: String,
    annotations: BTreeMap<&'static str, Option<String>>,
}

fn editable(storage_class: &StorageClass) -> EditableStorageClass {
    let access_modes = if storage_class.access_modes.is_empty() {
        None
    } else {
        Some(AccessMode::join(&storage_class.access_modes))
    };
    let mut annotations = BTreeMap::new();
    annotations.insert(ACCESS_MODES_ANNOTATION, access_modes);

    EditableStorageClass {
        metadata: EditableMeta {
            name: storage_class.name.clone(),
            annotations,
        },
        resource: StorageClassResource {
            allow_volume_expansion: Some(storage_class.allow_volume_expansion),
            provisioner: storage_class.provisioner.clone(),
            ..Default::default()
        },
    }
}

/// merge patch turning old into new, none if nothing changed
pub fn patch_payload(
    old: &StorageClass,
    new: &StorageClass,
) -> Result<Option<Value>, ClientError> {
    let old_value = serde_json::to_value(editable(old))?;
    let new_value = serde_json::to_value(editable(new))?;
    match old_value.diff(&new_value)? {
        Diff::None => Ok(None),
        Diff::Patch(p) => {
            let json_diff = serde_json::to_value(p)?;
            trace!("{}: new/old diff: {:#?}", new.name, json_diff);
            Ok(Some(json_diff))
        }
        _ => Err(ClientError::PatchError),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchResult {
    None,
    Patched,
}

/// list and patch storage classes of an endpoint
pub struct StorageClassGateway<C> {
    client: SharedClient<C>,
}

impl<C> Clone for StorageClassGateway<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
        }
    }
}

impl<C> StorageClassGateway<C>
where
    C: StorageTransport,
{
    pub fn new(client: SharedClient<C>) -> Self {
        Self { client }
    }

    pub async fn list(&self, endpoint: EndpointId) -> Result<Vec<StorageClass>, GatewayError> {
        self.list_with_option(endpoint, None).await
    }

    pub async fn list_with_option(
        &self,
        endpoint: EndpointId,
        options: Option<ListOptions>,
    ) -> Result<Vec<StorageClass>, GatewayError> {
        debug!(%endpoint, "retrieving storage classes");
        let classes = self
            .client
            .retrieve_storage_classes(endpoint, options)
            .await
            .map_err(|err| GatewayError::new(LIST_FAILED, err))?;

        Ok(classes
            .items
            .into_iter()
            .map(api_to_storage_class)
            .collect())
    }

    /// patch only the fields which differ between previous and updated
    pub async fn apply_patch(
        &self,
        endpoint: EndpointId,
        previous: &StorageClass,
        updated: &StorageClass,
    ) -> Result<PatchResult, GatewayError> {
        let payload =
            patch_payload(previous, updated).map_err(|err| GatewayError::new(PATCH_FAILED, err))?;

        match payload {
            None => {
                debug!(%endpoint, "{}: no diff detected, doing nothing", updated.name);
                Ok(PatchResult::None)
            }
            Some(patch) => {
                debug!(%endpoint, "{}: patching storage class", updated.name);
                self.client
                    .patch_storage_class(endpoint, &updated.name, &patch)
                    .await
                    .map_err(|err| GatewayError::new(PATCH_FAILED, err))?;
                Ok(PatchResult::Patched)
            }
        }
    }
}
