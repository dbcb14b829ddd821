//! Response gate: decides whether an underlying call succeeded.
//!
//! One rule: a call failed if the transport raised, or if the response
//! status is outside 2xx/3xx. Failures are turned into errors here; the
//! call layer evicts the entry and the caller decides whether to retry.

use tracing::error;

use crate::types::{Method, Response};
use crate::{MemogateError, Result};

/// Classify the outcome of one transport round-trip.
///
/// Successful responses pass through. A non-2xx/3xx response becomes
/// [`MemogateError::Status`] carrying the response; transport errors pass
/// through unchanged.
pub(crate) fn classify(outcome: Result<Response>, path: &str) -> Result<Response> {
    match outcome {
        Ok(response) if response.is_ok() => Ok(response),
        Ok(response) => Err(MemogateError::Status {
            status: response.status(),
            path: path.to_string(),
            response: Box::new(response),
        }),
        Err(e) => Err(e),
    }
}

/// Emit the diagnostic event for a failed call.
pub(crate) fn report_failure(method: Method, path: &str, err: &MemogateError) {
    match err {
        MemogateError::Status { status, .. } => {
            error!(%method, path, status, "request failed");
        }
        MemogateError::Transport { kind, message, .. } => {
            error!(%method, path, kind = kind.as_str(), error = %message, "request failed");
        }
        other => {
            error!(%method, path, error = %other, "request failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::TransportErrorKind;

    fn response(status: u16) -> Response {
        Response::new(status, "https://api.test/x", BTreeMap::new(), Vec::new())
    }

    #[test]
    fn success_range_passes() {
        for status in [200, 201, 204, 301, 304] {
            assert!(classify(Ok(response(status)), "x").is_ok(), "{status}");
        }
    }

    #[test]
    fn error_statuses_fail_with_context() {
        for status in [400, 404, 429, 500, 503] {
            let err = classify(Ok(response(status)), "status/x").unwrap_err();
            assert_eq!(err.status(), Some(status));
            assert_eq!(err.response().unwrap().status(), status);
            assert!(err.to_string().contains("status/x"));
        }
    }

    #[test]
    fn transport_errors_pass_through() {
        let outcome = Err(MemogateError::Transport {
            kind: TransportErrorKind::Timeout,
            path: "delay/9".into(),
            message: "timed out".into(),
        });
        let err = classify(outcome, "delay/9").unwrap_err();
        assert_eq!(err.transport_kind(), Some(TransportErrorKind::Timeout));
    }
}
