mod client_impl;

pub use client_impl::HttpClient;

use hyper::client::HttpConnector;
use hyper::Body;
use hyper::Client;
use hyper_rustls::HttpsConnector;
use hyper_rustls::HttpsConnectorBuilder;

pub(crate) type HyperClient = Client<HttpsConnector<HttpConnector>, Body>;

/// plain http is allowed for consoles on local network
pub(crate) fn build_hyper_client() -> HyperClient {
    let connector = HttpsConnectorBuilder::new()
        .with_native_roots()
        .https_or_http()
        .enable_http1()
        .build();
    Client::builder().build(connector)
}
