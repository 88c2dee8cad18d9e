//! The fake transport.
//!
//! An [`Interceptor`] starts unarmed and is armed exactly once with a snapshot of a
//! registry. Every request is answered in-process: the first matching rule's
//! response, or the no-match outcome chosen by `fail_on_unmatched`.

use crate::client::Transport;
use crate::error::InterceptError;
use crate::registry::{dispatch, InterceptorOptions, Rule};
use crate::request::RequestDescriptor;
use bytes::Bytes;
use hyper::{Request, Response};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, info, warn};

/// A request as seen by the interceptor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Index of the rule that answered, `None` when nothing matched
    pub matched_rule: Option<usize>,
}

impl RecordedRequest {
    fn capture(request: &RequestDescriptor<'_>, matched_rule: Option<usize>) -> Self {
        let headers = request
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = request.body();
        Self {
            method: request.method().to_string(),
            url: request.url(),
            headers,
            body: (!body.is_empty()).then(|| String::from_utf8_lossy(body).into_owned()),
            matched_rule,
        }
    }
}

struct Armed {
    rules: Arc<[Arc<Rule>]>,
    fail_on_unmatched: bool,
    record_requests: bool,
}

/// In-process transport answering requests from registered rules.
pub struct Interceptor {
    armed: OnceLock<Armed>,
    request_count: AtomicU64,
    recorded_requests: Mutex<Vec<RecordedRequest>>,
}

impl Default for Interceptor {
    fn default() -> Self {
        Self::new()
    }
}

impl Interceptor {
    /// Create an unarmed interceptor. Every `send` fails until [`arm`](Self::arm) is called.
    pub fn new() -> Self {
        Self {
            armed: OnceLock::new(),
            request_count: AtomicU64::new(0),
            recorded_requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn armed(options: &InterceptorOptions) -> Self {
        let interceptor = Self::new();
        // a fresh interceptor cannot be armed twice
        let _ = interceptor.arm(options);
        interceptor
    }

    /// Attach a snapshot of `options`. Allowed once.
    pub fn arm(&self, options: &InterceptorOptions) -> Result<(), InterceptError> {
        self.armed
            .set(Armed {
                rules: options.snapshot(),
                fail_on_unmatched: options.fail_on_unmatched,
                record_requests: options.record_requests,
            })
            .map_err(|_| InterceptError::AlreadyArmed)?;
        info!(
            rules = options.len(),
            fail_on_unmatched = options.fail_on_unmatched,
            "Interceptor armed"
        );
        Ok(())
    }

    pub fn is_armed(&self) -> bool {
        self.armed.get().is_some()
    }

    /// Answer one request.
    ///
    /// `Ok(None)` is the permissive no-match outcome; callers treat it like a
    /// refused connection.
    pub fn send(&self, request: &Request<Bytes>) -> Result<Option<Response<Bytes>>, InterceptError> {
        let armed = self.armed.get().ok_or(InterceptError::NotConfigured)?;
        self.request_count.fetch_add(1, Ordering::Relaxed);

        let descriptor = RequestDescriptor::new(request);
        let dispatched = dispatch(&armed.rules, &descriptor);

        if armed.record_requests {
            let matched_rule = dispatched.as_ref().map(|d| d.rule_index);
            self.recorded_requests
                .lock()
                .push(RecordedRequest::capture(&descriptor, matched_rule));
        }

        if let Some(dispatched) = dispatched {
            return Ok(Some(dispatched.response.build()));
        }

        if armed.fail_on_unmatched {
            let err = InterceptError::UnmatchedRequest {
                method: descriptor.method().to_string(),
                scheme: descriptor.scheme().unwrap_or("").to_string(),
                host: descriptor.host().unwrap_or("").to_string(),
                port: descriptor.port().map(str::to_string),
                path: descriptor.path().to_string(),
            };
            error!("{} ({} rule(s) registered)", err, armed.rules.len());
            return Err(err);
        }

        warn!(
            "No rule matched {} {}, answering with no response",
            descriptor.method(),
            descriptor.url()
        );
        debug!(?descriptor, "Unmatched request");
        Ok(None)
    }

    /// Number of requests sent while armed.
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Copy of the request journal, oldest first.
    pub fn received_requests(&self) -> Vec<RecordedRequest> {
        self.recorded_requests.lock().clone()
    }

    pub fn clear_recorded_requests(&self) {
        self.recorded_requests.lock().clear();
    }
}

impl Transport for Interceptor {
    fn send(&self, request: &Request<Bytes>) -> Result<Option<Response<Bytes>>, InterceptError> {
        Interceptor::send(self, request)
    }
}
