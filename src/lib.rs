//! Memogate - memoized HTTP calls with fingerprint-addressed caching
//!
//! This crate wraps HTTP endpoints as reusable, cacheable calls. A
//! [`Session`] holds a base URL, a default TTL and a cache store; each
//! [`MemoizedCall`] it creates resolves a path template against call
//! arguments, fingerprints the resulting request and serves repeats from
//! the store until the TTL runs out. Failed responses are never cached.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use memogate::{CallArgs, Session};
//!
//! #[tokio::main]
//! async fn main() -> memogate::Result<()> {
//!     let session = Session::builder("https://eu.httpbin.org/")
//!         .cache_ttl(Duration::from_secs(20))
//!         .build()?;
//!
//!     let echo = session.post_json("anything")?;
//!     let args = CallArgs::new().named("name", "memogate").named("len", 8);
//!
//!     let first = echo.invoke(&args).await?; // network
//!     let second = echo.invoke(&args).await?; // store
//!     assert_eq!(first.body, second.body);
//!
//!     println!("{:?}", echo.stats());
//!     Ok(())
//! }
//! ```
//!
//! # Path templates
//!
//! Templates use `{}` (next positional argument), `{0}` (indexed
//! positional) and `{name}` (named) placeholders, with `{{`/`}}` for
//! literal braces. Named arguments not consumed by the template become the
//! request body: form-encoded for [`Raw`] calls, JSON for [`Structured`]
//! ones. See [`PathTemplate`].

pub mod call;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod session;
pub mod store;
pub mod telemetry;
pub mod template;
pub mod transport;
pub mod types;

// Re-export main types at crate root
pub use call::{CallStats, Flavor, MemoizedCall, Raw, Structured};
pub use config::SessionConfig;
pub use error::{MemogateError, Result, TransportErrorKind};
pub use fingerprint::{Fingerprint, FingerprintGenerator};
pub use session::{Session, SessionBuilder};
pub use store::{CacheStore, MemoryStore, MemoryStoreConfig};
pub use template::PathTemplate;
pub use transport::{HttpTransport, HttpTransportBuilder, RequestBody, Transport, TransportRequest};
pub use types::{CallArgs, JsonResponse, Method, Response};
