use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use kc_client::EndpointGateway;
use kc_types::endpoint::{Endpoint, EndpointId};

use crate::Notifier;

/// views the console can move to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    Home,
    EndpointEdit(EndpointId),
    Configure(EndpointId),
}

impl RouteTarget {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Home => "console.home",
            Self::EndpointEdit(_) => "console.endpoints.endpoint",
            Self::Configure(_) => "kubernetes.configure",
        }
    }

    pub fn endpoint(&self) -> Option<EndpointId> {
        match self {
            Self::Home => None,
            Self::EndpointEdit(id) | Self::Configure(id) => Some(*id),
        }
    }
}

impl fmt::Display for RouteTarget {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.endpoint() {
            Some(id) => write!(f, "{}({})", self.name(), id),
            None => write!(f, "{}", self.name()),
        }
    }
}

/// moves the console between views
pub trait Router: Send + Sync {
    fn go(&self, target: RouteTarget, reload: bool);
}

pub type SharedRouter = Arc<dyn Router>;

/// router for surfaces without views, transitions are only logged
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRouter;

impl Router for TracingRouter {
    fn go(&self, target: RouteTarget, reload: bool) {
        info!(%target, reload, "route transition");
    }
}

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("invalid endpoint identifier: {0:?}")]
    InvalidEndpointId(String),
}

pub fn parse_endpoint_id(raw: &str) -> Result<EndpointId, RouteError> {
    raw.trim()
        .parse()
        .map_err(|_| RouteError::InvalidEndpointId(raw.to_owned()))
}

const LOAD_FAILED: &str = "Failed loading endpoint";

/// Resolve endpoint for views scoped to single endpoint.
///
/// Invalid or unknown endpoints send the console home, edge endpoints
/// whose agent has not been associated yet go to the endpoint edit view.
/// Only when the view may proceed the endpoint is returned.
pub async fn resolve_endpoint<C>(
    client: &C,
    notifier: &dyn Notifier,
    router: &dyn Router,
    raw_id: &str,
) -> Option<Endpoint>
where
    C: EndpointGateway + ?Sized,
{
    let id = match parse_endpoint_id(raw_id) {
        Ok(id) => id,
        Err(err) => {
            notifier.error("Failure", &err, LOAD_FAILED);
            router.go(RouteTarget::Home, true);
            return None;
        }
    };

    match client.retrieve_endpoint(id).await {
        Ok(endpoint) if endpoint.is_edge_without_key() => {
            debug!(%id, "edge endpoint has no key, redirect to edit");
            router.go(RouteTarget::EndpointEdit(id), false);
            None
        }
        Ok(endpoint) => Some(endpoint),
        Err(err) => {
            notifier.error("Failure", &err, LOAD_FAILED);
            router.go(RouteTarget::Home, true);
            None
        }
    }
}

#[cfg(test)]
mod test {

    use kc_types::endpoint::EndpointId;

    use super::{parse_endpoint_id, RouteTarget};

    #[test]
    fn test_parse_endpoint_id() {
        assert_eq!(parse_endpoint_id("12").expect("id"), EndpointId(12));
        assert!(parse_endpoint_id("abc").is_err());
        assert!(parse_endpoint_id("").is_err());
    }

    #[test]
    fn test_target_display() {
        assert_eq!(RouteTarget::Home.to_string(), "console.home");
        assert_eq!(
            RouteTarget::EndpointEdit(EndpointId(4)).to_string(),
            "console.endpoints.endpoint(4)"
        );
        assert_eq!(
            RouteTarget::Configure(EndpointId(4)).to_string(),
            "kubernetes.configure(4)"
        );
        assert_eq!(RouteTarget::Configure(EndpointId(4)).endpoint(), Some(EndpointId(4)));
    }
}
