use http::header::InvalidHeaderValue;
use http::status::StatusCode;
use http::uri::InvalidUri;
use hyper::Error as HyperError;
use thiserror::Error;

use kc_config::ConfigError;
use kc_diff::DiffError;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    JsonError(#[from] serde_json::Error),
    #[error("{0}")]
    DiffError(#[from] DiffError),
    #[error("{0}")]
    HttpError(#[from] http::Error),
    #[error("{0}")]
    InvalidHttpHeader(#[from] InvalidHeaderValue),
    #[error("{0}")]
    InvalidUri(#[from] InvalidUri),
    #[error("query encoding: {0}")]
    QueryError(#[from] serde_qs::Error),
    #[error("{0}")]
    HyperError(#[from] HyperError),
    #[error("{0}")]
    ConfigError(#[from] ConfigError),
    #[error("client error: {0}: {1}")]
    Client(StatusCode, String),
    #[error("not found")]
    NotFound,
    #[error("patch error")]
    PatchError,
    #[error("lock poison error")]
    LockPoisonError,
}

impl ClientError {
    pub fn not_founded(&self) -> bool {
        match self {
            Self::Client(status, _) => status == &StatusCode::NOT_FOUND,
            Self::NotFound => true,
            _ => false,
        }
    }
}

/// failure of a storage class operation, with message to show the operator
#[derive(Error, Debug)]
#[error("{message}: {source}")]
pub struct GatewayError {
    pub message: String,
    #[source]
    pub source: ClientError,
}

impl GatewayError {
    pub fn new<M: Into<String>>(message: M, source: ClientError) -> Self {
        Self {
            message: message.into(),
            source,
        }
    }
}
