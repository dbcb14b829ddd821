//! Telemetry metric name constants.
//!
//! Centralised metric names for memoized calls. Consumers install their
//! own `metrics` recorder (e.g. prometheus, statsd); without a recorder
//! installed, all metric calls are no-ops.
//!
//! The same hit/miss counts are also kept per call and exposed through
//! [`MemoizedCall::stats()`](crate::MemoizedCall::stats), which needs no
//! recorder.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `memogate_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `method` — HTTP method (e.g. "GET", "POST")
//! - `template` — the endpoint's path template as written (e.g. "delay/{n}")
//! - `status` — outcome: "ok" or "error"

/// Invocations served from the store.
///
/// Labels: `method`, `template`.
pub const CACHE_HITS_TOTAL: &str = "memogate_cache_hits_total";

/// Invocations that went through to the transport on a cacheable call.
///
/// Labels: `method`, `template`.
pub const CACHE_MISSES_TOTAL: &str = "memogate_cache_misses_total";

/// Entries deleted, by explicit bust or by the response gate.
///
/// Labels: `method`, `template`.
pub const CACHE_BUSTS_TOTAL: &str = "memogate_cache_busts_total";

/// Store adapter failures (lookup, write or delete). The call degrades to
/// an uncached request instead of failing.
///
/// Labels: `method`, `template`, `operation` ("get" | "set" | "delete").
pub const STORE_ERRORS_TOTAL: &str = "memogate_store_errors_total";

/// Underlying transport calls, cached or not.
///
/// Labels: `method`, `template`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "memogate_requests_total";

/// Underlying transport call duration in seconds.
///
/// Labels: `method`, `template`.
pub const REQUEST_DURATION_SECONDS: &str = "memogate_request_duration_seconds";
