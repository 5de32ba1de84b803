//!
//! # Endpoint
//!
//! Cluster record as the console persists it. Only the fields the storage
//! configuration needs are typed; everything else is carried through untouched.
//!
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::de::Deserializer;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::storage::{AccessMode, StorageClass};

pub const EDGE_AGENT_ON_DOCKER: u8 = 4;
pub const EDGE_AGENT_ON_KUBERNETES: u8 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointId(pub u32);

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EndpointId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl From<u32> for EndpointId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct Endpoint {
    pub id: EndpointId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "Type", default)]
    pub endpoint_type: u8,
    #[serde(
        rename = "EdgeID",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub edge_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub kubernetes: KubernetesData,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Endpoint {
    pub fn new<N: Into<String>>(id: EndpointId, name: N) -> Self {
        Self {
            id,
            name: name.into(),
            ..Default::default()
        }
    }

    /// edge agent which has not been associated yet
    pub fn is_edge_without_key(&self) -> bool {
        (self.endpoint_type == EDGE_AGENT_ON_DOCKER
            || self.endpoint_type == EDGE_AGENT_ON_KUBERNETES)
            && self.edge_id.is_empty()
    }

    pub fn configuration(&self) -> &KubernetesConfiguration {
        &self.kubernetes.configuration
    }

    pub fn configuration_mut(&mut self) -> &mut KubernetesConfiguration {
        &mut self.kubernetes.configuration
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct KubernetesData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub configuration: KubernetesConfiguration,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct KubernetesConfiguration {
    #[serde(default)]
    pub use_load_balancer: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub storage_classes: Vec<StorageClassConfig>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl KubernetesConfiguration {
    pub fn storage_class(&self, name: &str) -> Option<&StorageClassConfig> {
        self.storage_classes.iter().find(|config| config.name == name)
    }
}

/// storage class as stored in cluster configuration
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct StorageClassConfig {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub access_modes: Vec<String>,
    #[serde(default)]
    pub provisioner: String,
    #[serde(default)]
    pub allow_volume_expansion: bool,
}

impl StorageClassConfig {
    /// configured modes known to the policy table
    pub fn known_access_modes(&self) -> Vec<AccessMode> {
        let mut modes: Vec<AccessMode> = self
            .access_modes
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect();
        modes.sort();
        modes.dedup();
        modes
    }
}

impl From<&StorageClass> for StorageClassConfig {
    fn from(class: &StorageClass) -> Self {
        Self {
            name: class.name.clone(),
            access_modes: class
                .access_modes
                .iter()
                .map(|mode| mode.name().to_owned())
                .collect(),
            provisioner: class.provisioner.clone(),
            allow_volume_expansion: class.allow_volume_expansion,
        }
    }
}
