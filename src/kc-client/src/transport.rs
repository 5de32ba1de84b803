use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use kc_types::endpoint::{Endpoint, EndpointId};
use kc_types::options::ListOptions;
use kc_types::storage::StorageClassResource;
use kc_types::{ApiList, ApiObject};

use crate::ClientError;

pub type SharedClient<C> = Arc<C>;

/// access to storage class resources of an endpoint
#[async_trait]
pub trait StorageTransport: Send + Sync {
    /// retrieve all storage classes in a single chunk
    async fn retrieve_storage_classes(
        &self,
        endpoint: EndpointId,
        options: Option<ListOptions>,
    ) -> Result<ApiList<StorageClassResource>, ClientError>;

    /// apply merge patch to single storage class
    async fn patch_storage_class(
        &self,
        endpoint: EndpointId,
        name: &str,
        patch: &Value,
    ) -> Result<ApiObject<StorageClassResource>, ClientError>;
}

/// access to endpoint records where cluster configuration is persisted
#[async_trait]
pub trait EndpointGateway: Send + Sync {
    async fn retrieve_endpoint(&self, id: EndpointId) -> Result<Endpoint, ClientError>;

    /// replace whole endpoint record
    async fn update_endpoint(
        &self,
        id: EndpointId,
        endpoint: &Endpoint,
    ) -> Result<Endpoint, ClientError>;
}
