use async_trait::async_trait;
use http::header::InvalidHeaderValue;
use hyper::header::HeaderValue;
use hyper::header::ACCEPT;
use hyper::header::AUTHORIZATION;
use hyper::header::CONTENT_TYPE;
use hyper::Body;
use hyper::Request;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use tracing::error;
use tracing::trace;

use kc_config::ProfileDetail;
use kc_types::endpoint::{Endpoint, EndpointId};
use kc_types::options::ListOptions;
use kc_types::storage::StorageClassResource;
use kc_types::{ApiList, ApiObject};

use crate::uri::{endpoint_uri, item_uri, items_uri};
use crate::{ClientError, EndpointGateway, StorageTransport};

use super::{build_hyper_client, HyperClient};

const JSON_CONTENT_TYPE: &str = "application/json";
const MERGE_PATCH_CONTENT_TYPE: &str = "application/merge-patch+json";

/// error body returned by console API
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct ApiError {
    message: String,
    details: String,
}

impl ApiError {
    fn describe(self) -> String {
        if self.details.is_empty() || self.details == self.message {
            self.message
        } else {
            format!("{} ({})", self.message, self.details)
        }
    }
}

/// Console API accessible thru HTTP
#[derive(Debug)]
pub struct HttpClient {
    client: HyperClient,
    host: String,
    token: Option<String>,
}

impl HttpClient {
    pub fn new(profile: &ProfileDetail) -> Self {
        let host = profile.api_url().to_owned();
        debug!("using console: {}", host);
        Self {
            client: build_hyper_client(),
            host,
            token: profile.token(),
        }
    }

    fn hostname(&self) -> &str {
        &self.host
    }

    fn finish_request(&self, request: &mut Request<Body>) -> Result<(), InvalidHeaderValue> {
        request
            .headers_mut()
            .insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));
        if let Some(ref token) = self.token {
            let full_token = format!("Bearer {token}");
            request
                .headers_mut()
                .insert(AUTHORIZATION, HeaderValue::from_str(&full_token)?);
        }
        Ok(())
    }

    /// handle request. this is async function
    async fn handle_request<T>(&self, mut request: Request<Body>) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        self.finish_request(&mut request)?;

        trace!("request: {} {}", request.method(), request.uri());

        let resp = self.client.request(request).await?;
        let status = resp.status();
        let buffer = hyper::body::to_bytes(resp.into_body()).await?;

        if status.is_success() {
            trace!(%status, "success response: {}", String::from_utf8_lossy(&buffer));
            serde_json::from_slice(&buffer).map_err(|err| {
                error!("json error: {}", err);
                error!("source: {}", String::from_utf8_lossy(&buffer));
                ClientError::from(err)
            })
        } else {
            trace!(%status, "error response: {}", String::from_utf8_lossy(&buffer));
            let message = match serde_json::from_slice::<ApiError>(&buffer) {
                Ok(api_error) => api_error.describe(),
                Err(_) => String::from_utf8_lossy(&buffer).trim().to_owned(),
            };
            Err(ClientError::Client(status, message))
        }
    }
}

#[async_trait]
impl StorageTransport for HttpClient {
    async fn retrieve_storage_classes(
        &self,
        endpoint: EndpointId,
        options: Option<ListOptions>,
    ) -> Result<ApiList<StorageClassResource>, ClientError> {
        let uri = items_uri::<StorageClassResource>(self.hostname(), endpoint, options.as_ref())?;
        debug!("retrieving storage classes: {}", uri);
        let request = Request::get(uri).body(Body::empty())?;
        self.handle_request(request).await
    }

    async fn patch_storage_class(
        &self,
        endpoint: EndpointId,
        name: &str,
        patch: &Value,
    ) -> Result<ApiObject<StorageClassResource>, ClientError> {
        let uri = item_uri::<StorageClassResource>(self.hostname(), endpoint, name)?;
        debug!("patching storage class: {}", uri);
        trace!("patch: {:#?}", patch);
        let request = Request::patch(uri)
            .header(CONTENT_TYPE, MERGE_PATCH_CONTENT_TYPE)
            .body(Body::from(serde_json::to_vec(patch)?))?;
        self.handle_request(request).await
    }
}

#[async_trait]
impl EndpointGateway for HttpClient {
    async fn retrieve_endpoint(&self, id: EndpointId) -> Result<Endpoint, ClientError> {
        let uri = endpoint_uri(self.hostname(), id)?;
        debug!("retrieving endpoint: {}", uri);
        let request = Request::get(uri).body(Body::empty())?;
        self.handle_request(request).await
    }

    async fn update_endpoint(
        &self,
        id: EndpointId,
        endpoint: &Endpoint,
    ) -> Result<Endpoint, ClientError> {
        let uri = endpoint_uri(self.hostname(), id)?;
        debug!("updating endpoint: {}", uri);
        let request = Request::put(uri)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(Body::from(serde_json::to_vec(endpoint)?))?;
        self.handle_request(request).await
    }
}
