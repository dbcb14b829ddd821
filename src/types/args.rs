//! Per-invocation call arguments.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::{MemogateError, Result};

/// Arguments for one invocation of a [`MemoizedCall`](crate::MemoizedCall).
///
/// - positional values fill `{}` / `{0}` placeholders in the path template
/// - named values fill `{name}` placeholders; named values that match no
///   placeholder become the request payload
/// - query parameters are sent as the query string
///
/// All three take part in the call fingerprint.
///
/// ```rust
/// # use memogate::CallArgs;
/// let args = CallArgs::new()
///     .named("category", "books")
///     .named("title", "The Tipping Point")
///     .param("page", 2);
/// assert_eq!(args.params()["page"], "2");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    positional: Vec<Value>,
    named: BTreeMap<String, Value>,
    params: BTreeMap<String, String>,
}

impl CallArgs {
    /// Empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build named arguments from a JSON object.
    ///
    /// Fails with [`MemogateError::Fingerprint`] for anything that is not
    /// an object.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self {
                named: map.into_iter().collect(),
                ..Self::default()
            }),
            other => Err(MemogateError::Fingerprint(format!(
                "call arguments must be a JSON object, got {other}"
            ))),
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a named argument.
    pub fn named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    /// Set a named argument from any serializable value.
    ///
    /// Values that cannot be represented as JSON (e.g. maps with non-string
    /// keys) are rejected here, before the call ever runs.
    pub fn try_named<T: Serialize + ?Sized>(
        mut self,
        name: impl Into<String>,
        value: &T,
    ) -> Result<Self> {
        let name = name.into();
        let value = serde_json::to_value(value).map_err(|e| {
            MemogateError::Fingerprint(format!("argument '{name}' is not serializable: {e}"))
        })?;
        self.named.insert(name, value);
        Ok(self)
    }

    /// Set a query-string parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn named_args(&self) -> &BTreeMap<String, Value> {
        &self.named
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty() && self.params.is_empty()
    }
}
