//! Sessions: the factory for memoized calls.
//!
//! A [`Session`] owns the base URL, the default TTL and the collaborators
//! every call shares (cache store, transport, fingerprint generator). It
//! does no caching itself; it only stamps out [`MemoizedCall`]s.
//!
//! ```rust,no_run
//! # use memogate::{CallArgs, Session};
//! # use std::time::Duration;
//! # async fn demo() -> memogate::Result<()> {
//! let session = Session::builder("https://eu.httpbin.org/")
//!     .header("Authorization", "Auth Token")
//!     .cache_ttl(Duration::from_secs(5))
//!     .build()?;
//!
//! let thing = session.get_json("anything?thing={0}")?;
//! let uncached = session.get("status/{code}")?.with_ttl(Duration::ZERO);
//!
//! let res = thing.invoke(&CallArgs::new().arg("flask")).await?;
//! assert_eq!(res.body["args"]["thing"], "flask");
//! # let _ = uncached;
//! # Ok(())
//! # }
//! ```
//!
//! # URL resolution
//!
//! Resolved paths are joined onto the base URL with RFC 3986 reference
//! resolution: with a base of `https://api.test/v1/`, `items` resolves to
//! `https://api.test/v1/items`, but with `https://api.test/v1` (no trailing
//! slash) it resolves to `https://api.test/items`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use tracing::info;

use crate::call::{CallContext, Flavor, MemoizedCall, Raw, Structured};
use crate::config::SessionConfig;
use crate::fingerprint::FingerprintGenerator;
use crate::store::{CacheStore, MemoryStore, MemoryStoreConfig};
use crate::template::PathTemplate;
use crate::transport::{HttpTransport, Transport};
use crate::types::Method;
use crate::{MemogateError, Result};

/// Factory for [`MemoizedCall`]s sharing one base URL, store and transport.
///
/// Cloning is cheap; clones share the store and transport.
#[derive(Clone)]
pub struct Session {
    ctx: Arc<CallContext>,
    default_ttl: Duration,
}

impl Session {
    /// Create a new builder for the given base URL.
    pub fn builder(base_url: impl Into<String>) -> SessionBuilder {
        SessionBuilder::new(base_url)
    }

    /// Build a session from a loaded configuration file.
    ///
    /// Uses an in-memory store and the HTTP transport configured by the
    /// file's `[store]`, `[http]` and `[headers]` sections.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        let mut builder = Self::builder(config.base_url.as_str())
            .cache_ttl(Duration::from_secs(config.cache_ttl_secs))
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .max_redirects(config.http.max_redirects)
            .store(Arc::new(MemoryStore::new(
                &MemoryStoreConfig::new().max_entries(config.store.max_entries),
            )));
        for (name, value) in &config.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(prefix) = &config.key_prefix {
            builder = builder.key_prefix(prefix.as_str());
        }
        builder.build()
    }

    pub fn base_url(&self) -> &str {
        self.ctx.base_url.as_str()
    }

    /// TTL given to calls that do not override it.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// The shared cache store.
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.ctx.store
    }

    /// A raw-flavor call (form body, [`Response`](crate::Response) output).
    pub fn request(&self, method: Method, template: &str) -> Result<MemoizedCall<Raw>> {
        self.endpoint(method, template)
    }

    /// A structured-flavor call (JSON body, [`JsonResponse`](crate::JsonResponse) output).
    pub fn request_json(&self, method: Method, template: &str) -> Result<MemoizedCall<Structured>> {
        self.endpoint(method, template)
    }

    /// A call of any flavor. The template is parsed here, so malformed
    /// templates fail at setup time.
    pub fn endpoint<F: Flavor>(&self, method: Method, template: &str) -> Result<MemoizedCall<F>> {
        let template = PathTemplate::parse(template)?;
        Ok(MemoizedCall::new(
            Arc::clone(&self.ctx),
            method,
            template,
            self.default_ttl,
        ))
    }

    pub fn get(&self, template: &str) -> Result<MemoizedCall<Raw>> {
        self.request(Method::Get, template)
    }

    pub fn post(&self, template: &str) -> Result<MemoizedCall<Raw>> {
        self.request(Method::Post, template)
    }

    pub fn patch(&self, template: &str) -> Result<MemoizedCall<Raw>> {
        self.request(Method::Patch, template)
    }

    pub fn head(&self, template: &str) -> Result<MemoizedCall<Raw>> {
        self.request(Method::Head, template)
    }

    pub fn delete(&self, template: &str) -> Result<MemoizedCall<Raw>> {
        self.request(Method::Delete, template)
    }

    pub fn get_json(&self, template: &str) -> Result<MemoizedCall<Structured>> {
        self.request_json(Method::Get, template)
    }

    pub fn post_json(&self, template: &str) -> Result<MemoizedCall<Structured>> {
        self.request_json(Method::Post, template)
    }

    pub fn patch_json(&self, template: &str) -> Result<MemoizedCall<Structured>> {
        self.request_json(Method::Patch, template)
    }

    pub fn head_json(&self, template: &str) -> Result<MemoizedCall<Structured>> {
        self.request_json(Method::Head, template)
    }

    pub fn delete_json(&self, template: &str) -> Result<MemoizedCall<Structured>> {
        self.request_json(Method::Delete, template)
    }
}

/// Builder for configuring [`Session`] instances.
pub struct SessionBuilder {
    base_url: String,
    cache_ttl: Duration,
    key_prefix: Option<String>,
    store: Option<Arc<dyn CacheStore>>,
    transport: Option<Arc<dyn Transport>>,
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
    max_redirects: Option<usize>,
}

impl SessionBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            cache_ttl: Duration::ZERO,
            key_prefix: None,
            store: None,
            transport: None,
            headers: Vec::new(),
            timeout: None,
            max_redirects: None,
        }
    }

    /// Default TTL for calls made from this session. Default: zero
    /// (caching off unless a call overrides it).
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Namespace fingerprints as `"{prefix}:{digest}"`, for stores shared
    /// between sessions or services.
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Use a specific cache store. Default: a fresh [`MemoryStore`].
    pub fn store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a specific transport. Default: an [`HttpTransport`] built from
    /// the header, timeout and redirect settings, which are ignored when a
    /// transport is supplied here.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Add a header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the redirect limit.
    pub fn max_redirects(mut self, n: usize) -> Self {
        self.max_redirects = Some(n);
        self
    }

    /// Build the session.
    pub fn build(self) -> Result<Session> {
        let base_url = Url::parse(&self.base_url).map_err(|e| {
            MemogateError::InvalidUrl(format!("invalid base URL '{}': {e}", self.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(MemogateError::InvalidUrl(format!(
                "'{}' cannot be used as a base URL",
                self.base_url
            )));
        }

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let mut builder = HttpTransport::builder().headers(self.headers);
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                if let Some(n) = self.max_redirects {
                    builder = builder.max_redirects(n);
                }
                Arc::new(builder.build()?)
            }
        };
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::default()));

        let mut fingerprints = FingerprintGenerator::new();
        if let Some(prefix) = self.key_prefix {
            fingerprints = fingerprints.with_key_prefix(prefix);
        }

        info!(
            base_url = %base_url,
            cache_ttl_secs = self.cache_ttl.as_secs_f64(),
            store = store.name(),
            transport = transport.name(),
            "session ready"
        );

        Ok(Session {
            ctx: Arc::new(CallContext {
                base_url,
                store,
                transport,
                fingerprints,
            }),
            default_ttl: self.cache_ttl,
        })
    }
}
