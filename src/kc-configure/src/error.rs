use thiserror::Error;

use kc_client::{ClientError, GatewayError};

use crate::ReconcilerState;

/// storage class which could not be patched while applying configuration
#[derive(Debug)]
pub struct PatchFailure {
    pub name: String,
    pub error: GatewayError,
}

#[derive(Error, Debug)]
pub enum ConfigureError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("Unable to retrieve endpoint: {0}")]
    Endpoint(#[source] ClientError),
    #[error("Unable to apply configuration: {0}")]
    Update(#[source] ClientError),
    #[error("operation not allowed while {0}")]
    NotReady(ReconcilerState),
    #[error("endpoint configuration is not loaded")]
    EndpointNotLoaded,
    #[error("every selected storage class needs at least one access mode")]
    InvalidConfiguration,
    #[error("unknown storage class: {0}")]
    UnknownStorageClass(String),
    #[error("Unable to patch storage classes: {}", failed_names(.0))]
    PatchFailures(Vec<PatchFailure>),
}

fn failed_names(failures: &[PatchFailure]) -> String {
    failures
        .iter()
        .map(|failure| failure.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod test {

    use kc_client::{ClientError, GatewayError};

    use super::{ConfigureError, PatchFailure};

    #[test]
    fn test_patch_failures_lists_names() {
        let failures = ["fast", "slow"]
            .into_iter()
            .map(|name| PatchFailure {
                name: name.to_owned(),
                error: GatewayError::new("Unable to patch storage class", ClientError::NotFound),
            })
            .collect();
        assert_eq!(
            ConfigureError::PatchFailures(failures).to_string(),
            "Unable to patch storage classes: fast, slow"
        );
    }
}
