//! HTTP response values produced by a [`Transport`](crate::transport::Transport)
//! and stored in the cache.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{MemogateError, Result};

/// A completed HTTP response.
///
/// Fully buffered, so it can be serialized into a [`CacheStore`](crate::store::CacheStore)
/// and handed back on a cache hit. Header names are lowercased; repeated
/// headers are joined with `", "`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    status: u16,
    url: String,
    headers: BTreeMap<String, String>,
    #[serde(with = "body_base64")]
    body: Vec<u8>,
}

impl Response {
    /// Build a response from its parts.
    pub fn new(
        status: u16,
        url: impl Into<String>,
        headers: BTreeMap<String, String>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            status,
            url: url.into(),
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v))
                .collect(),
            body: body.into(),
        }
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the status is in the success family (2xx or 3xx).
    pub fn is_ok(&self) -> bool {
        (200..400).contains(&self.status)
    }

    /// Final request URL, including the query string.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// All response headers.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Look up a header, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Raw body bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Encode for storage.
    pub(crate) fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a stored entry.
    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| MemogateError::Decode(format!("corrupt cache entry: {e}")))
    }
}

/// A response from a structured (JSON) call, with its body already decoded.
///
/// An empty body (e.g. `HEAD`, `204 No Content`) decodes to `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    pub response: Response,
    pub body: serde_json::Value,
}

impl JsonResponse {
    pub(crate) fn decode(response: Response) -> Result<Self> {
        let body = if response.bytes().iter().all(u8::is_ascii_whitespace) {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(response.bytes()).map_err(|e| {
                MemogateError::Decode(format!("{} did not return JSON: {e}", response.url()))
            })?
        };
        Ok(Self { response, body })
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.response.status()
    }

    /// Deserialize the decoded body into a concrete type.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T> {
        Ok(serde_json::from_value(self.body)?)
    }
}

mod body_base64 {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(body))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
