//! Error types for rule registration, dispatch and the client facade.

/// Errors raised while building rules or dispatching an intercepted request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterceptError {
    #[error("interceptor not configured")]
    NotConfigured,
    #[error("interceptor is already armed")]
    AlreadyArmed,
    #[error("Builder incomplete: no Response Producer set")]
    Incomplete,
    #[error("Builder incomplete: at least one matcher is required")]
    NoMatchers,
    #[error("Response Producer already set")]
    ResponderAlreadySet,
    #[error("unmatched request: {method} {scheme}://{host}{port_suffix}{path}", port_suffix = .port.as_deref().map(|p| format!(":{p}")).unwrap_or_default())]
    UnmatchedRequest {
        method: String,
        scheme: String,
        host: String,
        port: Option<String>,
        path: String,
    },
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Errors surfaced to code calling through [`Client`](crate::Client).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid url '{0}'")]
    InvalidUrl(String),
    #[error("failed to build request: {0}")]
    Request(#[from] hyper::http::Error),
    /// The transport produced no response, the in-process equivalent of a refused connection.
    #[error("{method} {url}: no response (connection refused)")]
    NoResponse { method: String, url: String },
    #[error(transparent)]
    Transport(#[from] InterceptError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmatched_message_includes_port_when_present() {
        let err = InterceptError::UnmatchedRequest {
            method: "GET".to_string(),
            scheme: "http".to_string(),
            host: "tester.com".to_string(),
            port: Some("8080".to_string()),
            path: "/test/".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unmatched request: GET http://tester.com:8080/test/"
        );
    }

    #[test]
    fn test_unmatched_message_without_port() {
        let err = InterceptError::UnmatchedRequest {
            method: "PUT".to_string(),
            scheme: "https".to_string(),
            host: "test.com".to_string(),
            port: None,
            path: "/".to_string(),
        };
        assert_eq!(err.to_string(), "unmatched request: PUT https://test.com/");
    }

    #[test]
    fn test_transport_error_is_transparent() {
        let err: ClientError = InterceptError::NotConfigured.into();
        assert_eq!(err.to_string(), "interceptor not configured");
    }
}
