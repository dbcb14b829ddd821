//! Call fingerprints: the store keys for memoized responses.
//!
//! A fingerprint is the SHA-256 of a canonical JSON rendering of the call
//! identity `(method, base URL, resolved path, payload)`.
//!
//! # Canonical form
//!
//! The identity is encoded as compact JSON with object keys sorted
//! lexicographically at every depth. Sorting is done by the writer here,
//! not inherited from `serde_json`'s map type, so enabling `preserve_order`
//! anywhere in the dependency graph cannot change keys.
//!
//! JSON types are kept distinct: `1`, `1.0`, `"1"`, `null` and `""` all
//! produce different fingerprints, and an argument passed as `null` differs
//! from one that was never passed. Two calls collide exactly when their
//! canonical documents are byte-equal.

use std::fmt;

use serde_json::{Value, json};
use sha2::{Digest, Sha256};

use crate::types::Method;

/// Opaque store key for one logical call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derives fingerprints, optionally namespaced with a key prefix.
///
/// With a prefix the key is `"{prefix}:{hex}"`, which lets several sessions
/// share one store without touching each other's entries.
#[derive(Debug, Clone, Default)]
pub struct FingerprintGenerator {
    key_prefix: Option<String>,
}

impl FingerprintGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn key_prefix(&self) -> Option<&str> {
        self.key_prefix.as_deref()
    }

    /// Fingerprint one call identity.
    pub fn generate(
        &self,
        method: Method,
        base_url: &str,
        path: &str,
        payload: &Value,
    ) -> Fingerprint {
        let identity = json!({
            "method": method.as_str(),
            "base_url": base_url,
            "path": path,
            "payload": payload,
        });
        let mut canonical = String::new();
        write_canonical(&identity, &mut canonical);

        let digest = Sha256::digest(canonical.as_bytes());
        let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        match &self.key_prefix {
            Some(prefix) => Fingerprint(format!("{prefix}:{hex}")),
            None => Fingerprint(hex),
        }
    }
}

/// Compact JSON with sorted object keys.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::from(key.as_str()).to_string());
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
