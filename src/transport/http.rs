//! reqwest-backed transport.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;

use super::{RequestBody, Transport, TransportRequest};
use crate::types::Response;
use crate::{MemogateError, Result, TransportErrorKind};

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default redirect limit.
const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Builder for [`HttpTransport`].
///
/// ```rust
/// # use memogate::HttpTransport;
/// # use std::time::Duration;
/// let transport = HttpTransport::builder()
///     .header("Authorization", "Bearer token")
///     .timeout(Duration::from_secs(10))
///     .max_redirects(3)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransportBuilder {
    headers: Vec<(String, String)>,
    timeout: Duration,
    max_redirects: usize,
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl HttpTransportBuilder {
    /// Add a header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add several default headers.
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Total timeout per request (connect + response). Default: 30s.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Maximum redirects followed before failing. Default: 10.
    pub fn max_redirects(mut self, n: usize) -> Self {
        self.max_redirects = n;
        self
    }

    /// Build the transport.
    pub fn build(self) -> Result<HttpTransport> {
        let mut default_headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                MemogateError::Configuration(format!("invalid header name '{name}': {e}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                MemogateError::Configuration(format!("invalid value for header '{name}': {e}"))
            })?;
            default_headers.insert(name, value);
        }

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(self.timeout)
            .redirect(Policy::limited(self.max_redirects))
            .build()
            .map_err(|e| {
                MemogateError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(HttpTransport {
            http,
            headers: self.headers,
        })
    }
}

/// [`Transport`] over a shared `reqwest` client.
///
/// Cloning is cheap and shares the connection pool.
#[derive(Clone)]
pub struct HttpTransport {
    http: Client,
    headers: Vec<(String, String)>,
}

impl HttpTransport {
    /// Transport with default timeout, redirect limit and no extra headers.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    /// Default headers sent with every request.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(&self, request: TransportRequest) -> Result<Response> {
        let TransportRequest {
            method,
            url,
            path,
            query,
            body,
        } = request;

        let mut builder = self.http.request(method.into(), url);
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        builder = match &body {
            RequestBody::Empty => builder,
            RequestBody::Form(fields) => builder.form(fields),
            RequestBody::Json(value) => builder.json(value),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(&path, &e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in response.headers() {
            let value = String::from_utf8_lossy(value.as_bytes());
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert_with(|| value.into_owned());
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(&path, &e))?;

        Ok(Response::new(status, final_url, headers, body.to_vec()))
    }
}

fn transport_error(path: &str, err: &reqwest::Error) -> MemogateError {
    MemogateError::Transport {
        kind: TransportErrorKind::from_reqwest(err),
        path: path.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let builder = HttpTransport::builder();
        assert_eq!(builder.timeout, DEFAULT_TIMEOUT);
        assert_eq!(builder.max_redirects, DEFAULT_MAX_REDIRECTS);
        assert!(builder.headers.is_empty());
    }

    #[test]
    fn builder_keeps_headers() {
        let transport = HttpTransport::builder()
            .header("Authorization", "Auth Token")
            .headers([("X-Trace", "1")])
            .build()
            .unwrap();
        assert_eq!(transport.headers().len(), 2);
        assert_eq!(transport.headers()[0].0, "Authorization");
    }

    #[test]
    fn invalid_header_is_configuration_error() {
        let err = HttpTransport::builder()
            .header("bad header", "x")
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, MemogateError::Configuration(_)));
    }
}
