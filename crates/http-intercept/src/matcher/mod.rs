//! Request matchers.
//!
//! A [`Matcher`] is a pure predicate over one dimension of a [`RequestDescriptor`].
//! Matchers never fail: a matcher that cannot apply to a request (missing header,
//! relative URL without a port, non-UTF-8 value) evaluates to `false`.
//!
//! Several matchers on one rule are ANDed. There is no OR or NOT combinator;
//! alternatives are expressed by registering more rules, since the first matching
//! rule wins.
//!
//! ```
//! use http_intercept::matcher::{for_get, for_header, for_path};
//!
//! let matchers = [
//!     for_get(),
//!     for_path("/test/"),
//!     for_header("Content-Type", "application/json"),
//! ];
//! assert_eq!(matchers.len(), 3);
//! ```

mod cached;

pub use cached::CachedValue;

use crate::error::InterceptError;
use crate::request::RequestDescriptor;
use hyper::Method;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

type MatchFn = dyn Fn(&RequestDescriptor<'_>) -> bool + Send + Sync;

/// A single request predicate.
#[derive(Clone)]
pub enum Matcher {
    /// Method name, case-insensitive
    Method(CachedValue),
    /// URL scheme, case-insensitive
    Scheme(CachedValue),
    /// Host name, case-insensitive
    Host(CachedValue),
    /// Explicit port, textual equality
    Port(String),
    /// Exact path
    Path(String),
    /// Path prefix
    PathPrefix(String),
    /// Path regex
    PathRegex(Arc<Regex>),
    /// Header name (case-insensitive) with exact value
    Header { name: String, value: String },
    /// Query parameter with exact raw value
    Query { name: String, value: String },
    /// Exact request body
    Body(bytes::Bytes),
    /// Request body contains the given text
    BodyContains(String),
    /// Arbitrary predicate
    Custom(Arc<MatchFn>),
}

impl Matcher {
    /// Evaluate this matcher against a request.
    pub fn matches(&self, request: &RequestDescriptor<'_>) -> bool {
        match self {
            Matcher::Method(method) => method.equals(request.method(), false),
            Matcher::Scheme(scheme) => request
                .scheme()
                .is_some_and(|s| scheme.equals(s, false)),
            Matcher::Host(host) => request.host().is_some_and(|h| host.equals(h, false)),
            Matcher::Port(port) => request.port() == Some(port.as_str()),
            Matcher::Path(path) => request.path() == path.as_str(),
            Matcher::PathPrefix(prefix) => request.path().starts_with(prefix.as_str()),
            Matcher::PathRegex(regex) => regex.is_match(request.path()),
            Matcher::Header { name, value } => {
                request.header_values(name).any(|v| v == value.as_str())
            }
            Matcher::Query { name, value } => request.query_param(name) == Some(value.as_str()),
            Matcher::Body(expected) => request.body() == expected,
            Matcher::BodyContains(needle) => std::str::from_utf8(request.body())
                .is_ok_and(|body| body.contains(needle.as_str())),
            Matcher::Custom(predicate) => predicate(request),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Method(v) => write!(f, "method == {}", v.value),
            Matcher::Scheme(v) => write!(f, "scheme == {}", v.value),
            Matcher::Host(v) => write!(f, "host == {}", v.value),
            Matcher::Port(p) => write!(f, "port == {p}"),
            Matcher::Path(p) => write!(f, "path == {p}"),
            Matcher::PathPrefix(p) => write!(f, "path starts with {p}"),
            Matcher::PathRegex(r) => write!(f, "path matches {}", r.as_str()),
            Matcher::Header { name, value } => write!(f, "header {name} == {value}"),
            Matcher::Query { name, value } => write!(f, "query {name} == {value}"),
            Matcher::Body(b) => write!(f, "body == {} bytes", b.len()),
            Matcher::BodyContains(s) => write!(f, "body contains {s}"),
            Matcher::Custom(_) => f.write_str("custom"),
        }
    }
}

/// Match on the exact method name, ignoring case.
pub fn for_method(method: impl Into<String>) -> Matcher {
    Matcher::Method(CachedValue::new(method))
}

pub fn for_get() -> Matcher {
    for_method(Method::GET.as_str())
}

pub fn for_post() -> Matcher {
    for_method(Method::POST.as_str())
}

pub fn for_put() -> Matcher {
    for_method(Method::PUT.as_str())
}

pub fn for_patch() -> Matcher {
    for_method(Method::PATCH.as_str())
}

pub fn for_delete() -> Matcher {
    for_method(Method::DELETE.as_str())
}

pub fn for_scheme(scheme: impl Into<String>) -> Matcher {
    Matcher::Scheme(CachedValue::new(scheme))
}

/// Plain `http` requests only. Rejects `https` and relative URLs.
pub fn for_http() -> Matcher {
    for_scheme("http")
}

/// `https` requests only.
pub fn for_https() -> Matcher {
    for_scheme("https")
}

pub fn for_host(host: impl Into<String>) -> Matcher {
    Matcher::Host(CachedValue::new(host))
}

/// Match the port as written in the URL. A request without an explicit port never matches.
pub fn for_port(port: impl Into<String>) -> Matcher {
    Matcher::Port(port.into())
}

pub fn for_path(path: impl Into<String>) -> Matcher {
    Matcher::Path(path.into())
}

pub fn for_path_prefix(prefix: impl Into<String>) -> Matcher {
    Matcher::PathPrefix(prefix.into())
}

/// Match the path against a regex. The pattern is compiled here, not at dispatch.
pub fn for_path_regex(pattern: &str) -> Result<Matcher, InterceptError> {
    Regex::new(pattern)
        .map(|regex| Matcher::PathRegex(Arc::new(regex)))
        .map_err(|e| InterceptError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

/// Header name is case-insensitive, value is compared exactly (no trimming or case folding).
/// Any of the header's values may satisfy the matcher.
pub fn for_header(name: impl Into<String>, value: impl Into<String>) -> Matcher {
    Matcher::Header {
        name: name.into().to_ascii_lowercase(),
        value: value.into(),
    }
}

pub fn for_query_param(name: impl Into<String>, value: impl Into<String>) -> Matcher {
    Matcher::Query {
        name: name.into(),
        value: value.into(),
    }
}

pub fn for_body(body: impl Into<bytes::Bytes>) -> Matcher {
    Matcher::Body(body.into())
}

pub fn for_body_contains(needle: impl Into<String>) -> Matcher {
    Matcher::BodyContains(needle.into())
}

/// Wrap a closure as a matcher. The closure must be pure for dispatch to stay deterministic.
pub fn for_fn<F>(predicate: F) -> Matcher
where
    F: Fn(&RequestDescriptor<'_>) -> bool + Send + Sync + 'static,
{
    Matcher::Custom(Arc::new(predicate))
}
