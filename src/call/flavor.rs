//! Payload flavors: how a call packages its payload and decodes responses.
//!
//! The two flavors share everything else (templating, fingerprinting, the
//! cache loop, the response gate). The flavor name is part of the payload
//! document, so a raw and a structured call to the same path never share a
//! cache entry.

use serde_json::{Map, Value};

use crate::Result;
use crate::transport::RequestBody;
use crate::types::{JsonResponse, Response};

/// Strategy for packaging the payload and decoding the response.
pub trait Flavor: Send + Sync + 'static {
    /// What `invoke` returns for a successful call.
    type Output: Send;

    /// Payload key in the fingerprinted identity (`"form"` or `"json"`).
    const PAYLOAD_KEY: &'static str;

    /// Package the named arguments left over after path substitution.
    fn package(payload: &Map<String, Value>) -> RequestBody;

    /// Turn a successful response into the call's output.
    fn decode(response: Response) -> Result<Self::Output>;
}

/// Raw flavor: form-encoded body, undecoded [`Response`].
///
/// String values are sent verbatim; other values as their JSON text.
#[derive(Debug, Clone, Copy)]
pub struct Raw;

impl Flavor for Raw {
    type Output = Response;

    const PAYLOAD_KEY: &'static str = "form";

    fn package(payload: &Map<String, Value>) -> RequestBody {
        if payload.is_empty() {
            return RequestBody::Empty;
        }
        RequestBody::Form(
            payload
                .iter()
                .map(|(k, v)| {
                    let v = match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), v)
                })
                .collect(),
        )
    }

    fn decode(response: Response) -> Result<Response> {
        Ok(response)
    }
}

/// Structured flavor: JSON body, JSON-decoded [`JsonResponse`].
#[derive(Debug, Clone, Copy)]
pub struct Structured;

impl Flavor for Structured {
    type Output = JsonResponse;

    const PAYLOAD_KEY: &'static str = "json";

    fn package(payload: &Map<String, Value>) -> RequestBody {
        if payload.is_empty() {
            return RequestBody::Empty;
        }
        RequestBody::Json(Value::Object(payload.clone()))
    }

    fn decode(response: Response) -> Result<JsonResponse> {
        JsonResponse::decode(response)
    }
}
