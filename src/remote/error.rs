//! Error types for the compiler service client.
//!
//! [`RemoteError`] splits failures into transient conditions, which the
//! transport layer may retry, and definitive rejections, which it must not.
//! Uses `thiserror` to derive `Display` and `Error` from the `#[error(...)]`
//! attributes.

use thiserror::Error;

/// Errors that can occur while talking to the compiler service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The server answered with a non-success HTTP status. Transient: the
    /// transport layer retries it until the attempt budget runs out, then
    /// reports the last status seen.
    #[error("request status error: {status}")]
    Status { status: u16 },

    /// The service accepted the request but rejected its content with a
    /// nonzero envelope code. Definitive: never retried.
    #[error("request data error: {body}")]
    Rejected { code: i64, body: String },

    /// The response arrived but its body did not match the expected shape.
    #[error("malformed response body: {0}")]
    Malformed(String),

    /// Underlying network failure (DNS, connection refused, timeout).
    /// Wraps the original `reqwest` error via `#[from]`.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl RemoteError {
    /// Whether the transport retry loop may try this request again.
    pub fn is_transient(&self) -> bool {
        match self {
            RemoteError::Status { .. } => true,
            RemoteError::Network(e) => !e.is_decode(),
            RemoteError::Rejected { .. } | RemoteError::Malformed(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display() {
        let err = RemoteError::Status { status: 502 };
        assert_eq!(err.to_string(), "request status error: 502");
    }

    #[test]
    fn rejected_display_includes_body() {
        let err = RemoteError::Rejected {
            code: 2,
            body: r#"{"code":2,"data":null}"#.into(),
        };
        assert_eq!(err.to_string(), r#"request data error: {"code":2,"data":null}"#);
    }

    #[test]
    fn status_is_transient_rejection_is_not() {
        assert!(RemoteError::Status { status: 500 }.is_transient());
        assert!(
            !RemoteError::Rejected {
                code: 1,
                body: String::new()
            }
            .is_transient()
        );
        assert!(!RemoteError::Malformed("bad".into()).is_transient());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RemoteError>();
    }
}
