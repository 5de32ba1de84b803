use std::collections::BTreeMap;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use http::status::StatusCode;
use serde_json::Value;
use tracing::debug;

use kc_diff::apply_merge_patch;
use kc_types::endpoint::{Endpoint, EndpointId};
use kc_types::options::ListOptions;
use kc_types::storage::StorageClassResource;
use kc_types::{ApiList, ApiObject};

use crate::{ClientError, EndpointGateway, StorageTransport};

/// patch received by in memory client
#[derive(Debug, Clone, PartialEq)]
pub struct PatchRecord {
    pub endpoint: EndpointId,
    pub name: String,
    pub patch: Value,
}

type ItemKey = (EndpointId, String);

#[derive(Debug, Default)]
struct MemoryState {
    endpoints: BTreeMap<EndpointId, Value>,
    storage_classes: BTreeMap<ItemKey, Value>,
    patches: Vec<PatchRecord>,
    endpoint_updates: u32,
    fail_endpoint_retrieve: bool,
    fail_endpoint_update: bool,
    fail_storage_list: bool,
    failing_patches: HashSet<String>,
}

type ReadPoisonError<'a> = PoisonError<RwLockReadGuard<'a, MemoryState>>;

impl<'a> From<ReadPoisonError<'a>> for ClientError {
    fn from(_error: ReadPoisonError) -> Self {
        Self::LockPoisonError
    }
}

type WritePoisonError<'a> = PoisonError<RwLockWriteGuard<'a, MemoryState>>;

impl<'a> From<WritePoisonError<'a>> for ClientError {
    fn from(_error: WritePoisonError) -> Self {
        Self::LockPoisonError
    }
}

fn injected_failure(what: &str) -> ClientError {
    ClientError::Client(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("injected failure: {what}"),
    )
}

/// Console API kept in memory, items are stored as JSON the way the API returns them.
/// Cloned clients share the same store.
#[derive(Debug, Default, Clone)]
pub struct InMemoryClient {
    store: Arc<RwLock<MemoryState>>,
}

impl InMemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_endpoint(&self, endpoint: &Endpoint) -> Result<(), ClientError> {
        let value = serde_json::to_value(endpoint)?;
        let mut store = self.store.write()?;
        store.endpoints.insert(endpoint.id, value);
        Ok(())
    }

    pub fn insert_storage_class(
        &self,
        endpoint: EndpointId,
        item: &ApiObject<StorageClassResource>,
    ) -> Result<(), ClientError> {
        let value = serde_json::to_value(item)?;
        let mut store = self.store.write()?;
        store
            .storage_classes
            .insert((endpoint, item.metadata.name.clone()), value);
        Ok(())
    }

    pub fn endpoint(&self, id: EndpointId) -> Result<Endpoint, ClientError> {
        let store = self.store.read()?;
        let value = store.endpoints.get(&id).ok_or(ClientError::NotFound)?;
        Ok(serde_json::from_value(value.clone())?)
    }

    pub fn storage_class(
        &self,
        endpoint: EndpointId,
        name: &str,
    ) -> Result<ApiObject<StorageClassResource>, ClientError> {
        let store = self.store.read()?;
        let value = store
            .storage_classes
            .get(&(endpoint, name.to_owned()))
            .ok_or(ClientError::NotFound)?;
        Ok(serde_json::from_value(value.clone())?)
    }

    /// patches received so far, in arrival order
    pub fn patches(&self) -> Result<Vec<PatchRecord>, ClientError> {
        Ok(self.store.read()?.patches.clone())
    }

    pub fn endpoint_updates(&self) -> Result<u32, ClientError> {
        Ok(self.store.read()?.endpoint_updates)
    }

    pub fn fail_endpoint_retrieve(&self, fail: bool) -> Result<(), ClientError> {
        self.store.write()?.fail_endpoint_retrieve = fail;
        Ok(())
    }

    pub fn fail_endpoint_update(&self, fail: bool) -> Result<(), ClientError> {
        self.store.write()?.fail_endpoint_update = fail;
        Ok(())
    }

    pub fn fail_storage_list(&self, fail: bool) -> Result<(), ClientError> {
        self.store.write()?.fail_storage_list = fail;
        Ok(())
    }

    /// patches for this storage class will be rejected
    pub fn fail_patch_for(&self, name: &str) -> Result<(), ClientError> {
        self.store.write()?.failing_patches.insert(name.to_owned());
        Ok(())
    }
}

#[async_trait]
impl StorageTransport for InMemoryClient {
    async fn retrieve_storage_classes(
        &self,
        endpoint: EndpointId,
        options: Option<ListOptions>,
    ) -> Result<ApiList<StorageClassResource>, ClientError> {
        let store = self.store.read()?;
        if store.fail_storage_list {
            return Err(injected_failure("storage class list"));
        }

        let limit = options
            .and_then(|opt| opt.limit)
            .map(|limit| limit as usize)
            .unwrap_or(usize::MAX);

        let items = store
            .storage_classes
            .iter()
            .filter(|((id, _), _)| *id == endpoint)
            .take(limit)
            .map(|(_, value)| serde_json::from_value(value.clone()))
            .collect::<Result<Vec<ApiObject<StorageClassResource>>, _>>()?;

        Ok(items.into())
    }

    async fn patch_storage_class(
        &self,
        endpoint: EndpointId,
        name: &str,
        patch: &Value,
    ) -> Result<ApiObject<StorageClassResource>, ClientError> {
        let mut store = self.store.write()?;
        store.patches.push(PatchRecord {
            endpoint,
            name: name.to_owned(),
            patch: patch.clone(),
        });

        if store.failing_patches.contains(name) {
            return Err(injected_failure(name));
        }

        let item_value = store
            .storage_classes
            .get_mut(&(endpoint, name.to_owned()))
            .ok_or(ClientError::NotFound)?;
        apply_merge_patch(item_value, patch);
        debug!(%endpoint, "{}: patched in memory", name);

        Ok(serde_json::from_value(item_value.clone())?)
    }
}

#[async_trait]
impl EndpointGateway for InMemoryClient {
    async fn retrieve_endpoint(&self, id: EndpointId) -> Result<Endpoint, ClientError> {
        if self.store.read()?.fail_endpoint_retrieve {
            return Err(injected_failure("endpoint retrieve"));
        }
        self.endpoint(id)
    }

    async fn update_endpoint(
        &self,
        id: EndpointId,
        endpoint: &Endpoint,
    ) -> Result<Endpoint, ClientError> {
        let mut store = self.store.write()?;
        if store.fail_endpoint_update {
            return Err(injected_failure("endpoint update"));
        }
        if !store.endpoints.contains_key(&id) {
            return Err(ClientError::NotFound);
        }

        let value = serde_json::to_value(endpoint)?;
        store.endpoints.insert(id, value);
        store.endpoint_updates += 1;
        Ok(endpoint.clone())
    }
}
