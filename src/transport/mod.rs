//! Transport contract: how a memoized call reaches the network.
//!
//! The call layer only ever sees a [`Transport`]: one request in, one
//! fully-buffered [`Response`] (or a typed transport failure) out. Connection
//! pooling, TLS, redirects and timeouts live behind it. [`HttpTransport`] is
//! the reqwest-backed implementation; tests swap in counting or failing
//! doubles.

mod http;

pub use http::{HttpTransport, HttpTransportBuilder};

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Url;

use crate::Result;
use crate::types::{Method, Response};

/// Request body, already packaged by the call's flavor.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body.
    Empty,
    /// `application/x-www-form-urlencoded` fields.
    Form(Vec<(String, String)>),
    /// `application/json` document.
    Json(serde_json::Value),
}

/// One outbound request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    /// Absolute URL (base URL joined with the resolved path).
    pub url: Url,
    /// The resolved path, for error reports and logs.
    pub path: String,
    /// Query-string parameters, appended to any query already in `url`.
    pub query: BTreeMap<String, String>,
    pub body: RequestBody,
}

/// Performs HTTP requests for memoized calls.
///
/// Implementations return `Ok` for every completed round-trip, whatever the
/// status code; classification into success and failure is done by the
/// caller. Transport-level failures are reported as
/// [`MemogateError::Transport`](crate::MemogateError::Transport) with the
/// matching [`TransportErrorKind`](crate::TransportErrorKind).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name for logging/debugging.
    fn name(&self) -> &str;

    /// Send one request and buffer the response.
    async fn send(&self, request: TransportRequest) -> Result<Response>;
}
