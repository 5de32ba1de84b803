use std::sync::{Arc, PoisonError, RwLock};

use tracing::trace;

use kc_types::endpoint::Endpoint;

/// endpoints known to the console, shared between views.
/// the list is only ever swapped as a whole
#[derive(Debug, Default, Clone)]
pub struct EndpointStore {
    endpoints: Arc<RwLock<Vec<Endpoint>>>,
}

impl EndpointStore {
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self {
            endpoints: Arc::new(RwLock::new(endpoints)),
        }
    }

    pub fn list(&self) -> Vec<Endpoint> {
        self.endpoints
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace(&self, endpoints: Vec<Endpoint>) {
        trace!("replacing {} cached endpoints", endpoints.len());
        *self
            .endpoints
            .write()
            .unwrap_or_else(PoisonError::into_inner) = endpoints;
    }
}
