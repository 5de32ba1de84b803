use http::uri::InvalidUri;
use http::Uri;

use kc_types::endpoint::EndpointId;
use kc_types::options::ListOptions;
use kc_types::{Resource, ResourceKind};

use crate::ClientError;

/// endpoint record uri
pub fn endpoint_uri(host: &str, id: EndpointId) -> Result<Uri, InvalidUri> {
    format!("{host}/api/endpoints/{id}").parse()
}

/// collection uri, list options go into query
pub fn items_uri<R>(
    host: &str,
    endpoint: EndpointId,
    options: Option<&ListOptions>,
) -> Result<Uri, ClientError>
where
    R: Resource,
{
    let prefix = collection_uri(&R::KIND, host, endpoint);
    let query = match options.filter(|opt| !opt.is_empty()) {
        Some(opt) => format!("?{}", serde_qs::to_string(opt)?),
        None => String::new(),
    };
    Ok(format!("{prefix}{query}").parse()?)
}

/// single item uri
pub fn item_uri<R>(host: &str, endpoint: EndpointId, name: &str) -> Result<Uri, InvalidUri>
where
    R: Resource,
{
    let prefix = collection_uri(&R::KIND, host, endpoint);
    format!("{prefix}/{name}").parse()
}

/// cluster api of an endpoint is proxied by the console
pub fn collection_uri(kind: &ResourceKind, host: &str, endpoint: EndpointId) -> String {
    format!(
        "{host}/api/endpoints/{endpoint}/kubernetes/{}",
        kind.collection_path()
    )
}
