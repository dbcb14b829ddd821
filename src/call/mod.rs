//! Memoized calls: one HTTP endpoint wrapped with fingerprint-addressed
//! caching.
//!
//! # Invocation
//!
//! For every [`MemoizedCall::invoke()`]:
//!
//! 1. the path template is resolved and the leftover named arguments become
//!    the payload
//! 2. with a zero TTL the call goes straight to the transport; the store is
//!    never touched and no hit/miss is counted
//! 3. otherwise the fingerprint is looked up; a hit returns the stored
//!    response without a network round-trip
//! 4. on a miss the transport is called and the outcome classified by the
//!    response gate
//! 5. a success is written back with the call's TTL; a failure deletes the
//!    entry and is returned as an error
//!
//! Store failures never fail an invocation. A failed lookup is treated as a
//! miss and the result is not written back for that invocation; a failed
//! write or delete is logged and counted.
//!
//! # Concurrency
//!
//! Calls are `Send + Sync` and cheap to clone (clones share their stats).
//! There is no single-flight: concurrent misses on one fingerprint all reach
//! the transport, and the store's last write wins.

mod flavor;
mod gate;

pub use flavor::{Flavor, Raw, Structured};

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use reqwest::Url;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::fingerprint::{Fingerprint, FingerprintGenerator};
use crate::store::CacheStore;
use crate::telemetry;
use crate::template::PathTemplate;
use crate::transport::{Transport, TransportRequest};
use crate::types::{CallArgs, Method, Response};
use crate::{MemogateError, Result};

/// Collaborators shared by every call of one session.
pub(crate) struct CallContext {
    pub(crate) base_url: Url,
    pub(crate) store: Arc<dyn CacheStore>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) fingerprints: FingerprintGenerator,
}

/// Snapshot of a call's cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallStats {
    /// Invocations served from the store.
    pub hits: u64,
    /// Invocations that went to the transport on a cacheable call.
    pub misses: u64,
}

impl CallStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
}

/// A resolved invocation: the request to send and the key it caches under.
struct Prepared {
    request: TransportRequest,
    fingerprint: Fingerprint,
}

/// One HTTP endpoint (method + path template) with response memoization.
///
/// Created by the [`Session`](crate::Session) factory methods. `F` selects
/// the payload flavor: [`Raw`] (form body, [`Response`] output) or
/// [`Structured`] (JSON body, [`JsonResponse`](crate::JsonResponse) output).
///
/// ```rust,no_run
/// # use memogate::{CallArgs, Session};
/// # use std::time::Duration;
/// # async fn demo() -> memogate::Result<()> {
/// let session = Session::builder("https://httpbin.org/")
///     .cache_ttl(Duration::from_secs(20))
///     .build()?;
/// let delay = session.get_json("delay/{n}")?;
///
/// let args = CallArgs::new().named("n", 2);
/// delay.invoke(&args).await?; // miss: goes to the network
/// delay.invoke(&args).await?; // hit: served from the store
/// assert_eq!(delay.stats().hits, 1);
///
/// delay.bust(&args).await?; // next invoke is a miss again
/// # Ok(())
/// # }
/// ```
pub struct MemoizedCall<F: Flavor = Raw> {
    method: Method,
    template: Arc<PathTemplate>,
    ttl: Duration,
    ctx: Arc<CallContext>,
    stats: Arc<AtomicStats>,
    flavor: PhantomData<fn() -> F>,
}

impl<F: Flavor> Clone for MemoizedCall<F> {
    fn clone(&self) -> Self {
        Self {
            method: self.method,
            template: Arc::clone(&self.template),
            ttl: self.ttl,
            ctx: Arc::clone(&self.ctx),
            stats: Arc::clone(&self.stats),
            flavor: PhantomData,
        }
    }
}

impl<F: Flavor> fmt::Debug for MemoizedCall<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoizedCall")
            .field("method", &self.method)
            .field("template", &self.template.as_str())
            .field("flavor", &F::PAYLOAD_KEY)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl<F: Flavor> MemoizedCall<F> {
    pub(crate) fn new(
        ctx: Arc<CallContext>,
        method: Method,
        template: PathTemplate,
        ttl: Duration,
    ) -> Self {
        Self {
            method,
            template: Arc::new(template),
            ttl,
            ctx,
            stats: Arc::default(),
            flavor: PhantomData,
        }
    }

    /// Override the TTL inherited from the session. Zero disables caching.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// The path template as written.
    pub fn template(&self) -> &str {
        self.template.as_str()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether responses are memoized (TTL above zero).
    pub fn is_cached(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Cumulative hit/miss counters for this call.
    pub fn stats(&self) -> CallStats {
        CallStats {
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
        }
    }

    /// The store key `args` resolve to.
    pub fn fingerprint(&self, args: &CallArgs) -> Result<Fingerprint> {
        Ok(self.prepare(args)?.fingerprint)
    }

    /// Perform the call, serving it from the store when possible.
    ///
    /// Fails with [`MemogateError::Status`] for non-2xx/3xx responses and
    /// [`MemogateError::Transport`] for transport failures; in both cases
    /// the entry for this fingerprint is deleted first. Template and
    /// argument errors fail before any store or network access.
    pub async fn invoke(&self, args: &CallArgs) -> Result<F::Output> {
        let Prepared {
            request,
            fingerprint,
        } = self.prepare(args)?;
        let path = request.path.clone();

        if !self.is_cached() {
            return match self.dispatch(request).await {
                Ok(response) => F::decode(response),
                Err(e) => {
                    gate::report_failure(self.method, &path, &e);
                    Err(e)
                }
            };
        }

        let mut writable = true;
        match self.ctx.store.get(fingerprint.as_str()).await {
            Ok(Some(bytes)) => match Response::from_bytes(&bytes) {
                Ok(response) => {
                    self.record_hit(&path, &fingerprint);
                    return F::decode(response);
                }
                Err(e) => {
                    warn!(
                        method = %self.method,
                        path,
                        fingerprint = %fingerprint,
                        error = %e,
                        "discarding unreadable cache entry"
                    );
                }
            },
            Ok(None) => {}
            Err(e) => {
                writable = false;
                self.record_store_error("get", &fingerprint, &e);
            }
        }

        self.record_miss(&path, &fingerprint);
        match self.dispatch(request).await {
            Ok(response) => {
                let encoded = response.to_bytes();
                let output = F::decode(response)?;
                if writable {
                    match encoded {
                        Ok(bytes) => self.write_back(&fingerprint, bytes).await,
                        Err(e) => self.record_store_error("set", &fingerprint, &e),
                    }
                }
                Ok(output)
            }
            Err(e) => {
                self.evict(&fingerprint).await;
                gate::report_failure(self.method, &path, &e);
                Err(e)
            }
        }
    }

    /// Delete the entry `args` resolve to.
    ///
    /// Idempotent: busting a missing entry is a no-op. Store failures are
    /// logged, not returned; only argument errors fail. Does nothing when
    /// caching is disabled.
    pub async fn bust(&self, args: &CallArgs) -> Result<()> {
        let Prepared { fingerprint, .. } = self.prepare(args)?;
        if self.is_cached() {
            self.evict(&fingerprint).await;
        }
        Ok(())
    }

    fn prepare(&self, args: &CallArgs) -> Result<Prepared> {
        let path = self.template.render(args)?;

        let fields = self.template.field_names();
        let body: Map<String, Value> = args
            .named_args()
            .iter()
            .filter(|(name, _)| !fields.contains(*name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        let request_body = F::package(&body);

        let mut payload = Map::new();
        payload.insert(F::PAYLOAD_KEY.to_string(), Value::Object(body));
        if !args.params().is_empty() {
            let params = args
                .params()
                .iter()
                .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
                .collect();
            payload.insert("params".to_string(), Value::Object(params));
        }

        let fingerprint = self.ctx.fingerprints.generate(
            self.method,
            self.ctx.base_url.as_str(),
            &path,
            &Value::Object(payload),
        );

        let url = self.ctx.base_url.join(&path).map_err(|e| {
            MemogateError::InvalidUrl(format!(
                "cannot join '{path}' onto {}: {e}",
                self.ctx.base_url
            ))
        })?;

        Ok(Prepared {
            request: TransportRequest {
                method: self.method,
                url,
                path,
                query: args.params().clone(),
                body: request_body,
            },
            fingerprint,
        })
    }

    /// Send through the transport and run the response gate.
    async fn dispatch(&self, request: TransportRequest) -> Result<Response> {
        let path = request.path.clone();
        let start = Instant::now();
        let outcome = gate::classify(self.ctx.transport.send(request).await, &path);
        self.record_request(start, outcome.is_ok());
        outcome
    }

    async fn write_back(&self, fingerprint: &Fingerprint, bytes: Vec<u8>) {
        match self
            .ctx
            .store
            .set(fingerprint.as_str(), bytes, self.ttl)
            .await
        {
            Ok(()) => debug!(
                method = %self.method,
                template = self.template.as_str(),
                fingerprint = %fingerprint,
                ttl_secs = self.ttl.as_secs_f64(),
                "response cached"
            ),
            Err(e) => self.record_store_error("set", fingerprint, &e),
        }
    }

    async fn evict(&self, fingerprint: &Fingerprint) {
        match self.ctx.store.delete(fingerprint.as_str()).await {
            Ok(()) => {
                metrics::counter!(telemetry::CACHE_BUSTS_TOTAL,
                    "method" => self.method.as_str(),
                    "template" => self.template.as_str().to_owned(),
                )
                .increment(1);
                debug!(
                    method = %self.method,
                    template = self.template.as_str(),
                    fingerprint = %fingerprint,
                    "cache entry busted"
                );
            }
            Err(e) => self.record_store_error("delete", fingerprint, &e),
        }
    }

    // ========================================================================
    // Metrics recording
    // ========================================================================

    fn record_hit(&self, path: &str, fingerprint: &Fingerprint) {
        self.stats.hits.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(telemetry::CACHE_HITS_TOTAL,
            "method" => self.method.as_str(),
            "template" => self.template.as_str().to_owned(),
        )
        .increment(1);
        debug!(method = %self.method, path, fingerprint = %fingerprint, "cache hit");
    }

    fn record_miss(&self, path: &str, fingerprint: &Fingerprint) {
        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL,
            "method" => self.method.as_str(),
            "template" => self.template.as_str().to_owned(),
        )
        .increment(1);
        debug!(method = %self.method, path, fingerprint = %fingerprint, "cache miss");
    }

    fn record_store_error(
        &self,
        operation: &'static str,
        fingerprint: &Fingerprint,
        err: &MemogateError,
    ) {
        metrics::counter!(telemetry::STORE_ERRORS_TOTAL,
            "method" => self.method.as_str(),
            "template" => self.template.as_str().to_owned(),
            "operation" => operation,
        )
        .increment(1);
        warn!(
            store = self.ctx.store.name(),
            operation,
            fingerprint = %fingerprint,
            error = %err,
            "cache store unavailable, continuing uncached"
        );
    }

    /// Record request outcome metrics (counter + histogram).
    fn record_request(&self, start: Instant, ok: bool) {
        let status = if ok { "ok" } else { "error" };
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "method" => self.method.as_str(),
            "template" => self.template.as_str().to_owned(),
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
            "method" => self.method.as_str(),
            "template" => self.template.as_str().to_owned(),
        )
        .record(start.elapsed().as_secs_f64());
    }
}
