use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::Resource;

/// metadata of a resource as returned by the cluster
#[derive(Deserialize, Serialize, PartialEq, Debug, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectMeta {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub uid: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub resource_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    pub fn named<S>(name: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }
}

/// single resource object, resource fields sit at the top level next to metadata
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(bound(serialize = "R: Resource", deserialize = "R: Resource"))]
pub struct ApiObject<R>
where
    R: Resource,
{
    #[serde(default = "R::api_version")]
    pub api_version: String,
    #[serde(default = "R::kind")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(flatten)]
    pub resource: R,
}

impl<R> ApiObject<R>
where
    R: Resource,
{
    pub fn new<N>(name: N, resource: R) -> Self
    where
        N: Into<String>,
    {
        Self {
            api_version: R::api_version(),
            kind: R::kind(),
            metadata: ObjectMeta::named(name),
            resource,
        }
    }

    pub fn with_annotation<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.metadata.annotations.insert(key.into(), value.into());
        self
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    #[serde(rename = "continue", skip_serializing_if = "Option::is_none")]
    pub continue_token: Option<String>,
    #[serde(default)]
    pub resource_version: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(bound(serialize = "R: Resource", deserialize = "R: Resource"))]
pub struct ApiList<R>
where
    R: Resource,
{
    #[serde(default = "R::api_version")]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ListMeta,
    #[serde(default)]
    pub items: Vec<ApiObject<R>>,
}

impl<R> From<Vec<ApiObject<R>>> for ApiList<R>
where
    R: Resource,
{
    fn from(items: Vec<ApiObject<R>>) -> Self {
        Self {
            api_version: R::api_version(),
            kind: format!("{}List", R::kind()),
            metadata: ListMeta::default(),
            items,
        }
    }
}

#[cfg(test)]
mod test {

    use super::ApiList;
    use crate::storage::StorageClassResource;

    #[test]
    fn test_decode_list_without_metadata() {
        let raw = r#"{"items":[{"metadata":{"name":"standard"},"provisioner":"k8s.io/minikube-hostpath"}]}"#;
        let list: ApiList<StorageClassResource> = serde_json::from_str(raw).expect("decode");
        assert_eq!(list.api_version, "storage.k8s.io/v1");
        assert_eq!(list.items.len(), 1);
        let item = &list.items[0];
        assert_eq!(item.metadata.name, "standard");
        assert_eq!(item.kind, "StorageClass");
        assert_eq!(item.resource.provisioner, "k8s.io/minikube-hostpath");
        assert_eq!(item.resource.allow_volume_expansion, None);
    }

    #[test]
    fn test_empty_metadata_is_not_serialized() {
        let list: ApiList<StorageClassResource> = vec![].into();
        let value = serde_json::to_value(&list).expect("encode");
        assert_eq!(value["kind"], "StorageClassList");
        assert_eq!(value["metadata"], serde_json::json!({ "resourceVersion": "" }));
    }
}
