//! # HTTP client
//! The demo calls Google Cloud REST endpoints through reqwest.
//!
//! This module provides some simple functions to create a reqwest client
//! and to turn a failed response into an error envelope.
//!
//! ### Example
//! ```no_run
//! use std::time::Duration;
//!
//! use gcperr_lib::client::new_builder;
//!
//! let client = new_builder()
//!     .timeout(Duration::from_secs(10))
//!     .build()
//!     .unwrap();
//! ```

use std::time::Duration;

use reqwest::{Client, ClientBuilder, Response};

use crate::envelope::{GoogleApiError, Status};

/// Create a client with the default settings of [`new_builder`].
pub fn new() -> reqwest::Result<Client> {
    new_builder().build()
}

/// Create a new reqwest client builder with the gcperr user agent and a
/// 30 second timeout.
pub fn new_builder() -> ClientBuilder {
    ClientBuilder::new()
        .user_agent(concat!("gcperr/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
}

/// Which envelope a failed response should become.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Plain REST API; failures become [`GoogleApiError`].
    Rest,
    /// RPC-backed API served over HTTP/JSON; failures become [`Status`]
    /// when the body names an RPC status.
    Rpc,
}

/// Pass successful responses through; turn failures into an envelope.
pub async fn check_response(
    response: Response,
    transport: Transport,
) -> anyhow::Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let headers = response.headers().clone();
    let body = response.text().await?;
    Err(into_envelope(status.as_u16(), headers, body, transport))
}

pub(crate) fn into_envelope(
    status: u16,
    headers: http::HeaderMap,
    body: String,
    transport: Transport,
) -> anyhow::Error {
    if transport == Transport::Rpc {
        if let Some(rpc) = Status::from_response_body(&body) {
            return rpc.into();
        }
    }
    GoogleApiError::from_response(status, headers, body).into()
}
