mod client;
mod error;
mod in_memory;
mod storage;
mod transport;
pub mod uri;

pub use self::error::{ClientError, GatewayError};
pub use self::client::HttpClient;
pub use self::in_memory::{InMemoryClient, PatchRecord};
pub use self::storage::*;
pub use self::transport::{EndpointGateway, SharedClient, StorageTransport};
pub use kc_config::ConsoleConfig;
