//! Read-only view over an outgoing request.
//!
//! Matchers and response producers never see the `hyper` request directly. They go
//! through [`RequestDescriptor`], which resolves the URL components the same way for
//! absolute URLs (`http://host:port/path`) and relative ones (`/path` plus a `Host`
//! header).

use bytes::Bytes;
use hyper::{HeaderMap, Request};
use std::fmt;

/// Borrowed view of one outgoing request, valid for the duration of a dispatch.
#[derive(Clone, Copy)]
pub struct RequestDescriptor<'a> {
    request: &'a Request<Bytes>,
    host_header: Option<&'a str>,
}

impl<'a> RequestDescriptor<'a> {
    pub fn new(request: &'a Request<Bytes>) -> Self {
        let host_header = request
            .headers()
            .get(hyper::header::HOST)
            .and_then(|v| v.to_str().ok());
        Self {
            request,
            host_header,
        }
    }

    /// Method name as sent (`GET`, `PUT`, extension methods verbatim).
    pub fn method(&self) -> &'a str {
        self.request.method().as_str()
    }

    /// URL scheme, `None` for a relative request URI.
    pub fn scheme(&self) -> Option<&'a str> {
        self.request.uri().scheme_str()
    }

    /// Host from the URI authority, falling back to the `Host` header.
    pub fn host(&self) -> Option<&'a str> {
        self.request
            .uri()
            .host()
            .or_else(|| self.host_header.map(|h| split_host_port(h).0))
    }

    /// Port in its textual form. Absent unless written explicitly in the URI or `Host` header.
    pub fn port(&self) -> Option<&'a str> {
        let authority = match self.request.uri().authority() {
            Some(authority) => authority.as_str(),
            None => self.host_header?,
        };
        split_host_port(authority).1
    }

    pub fn path(&self) -> &'a str {
        self.request.uri().path()
    }

    pub fn query(&self) -> Option<&'a str> {
        self.request.uri().query()
    }

    /// First value of a query parameter, compared raw (no percent-decoding).
    pub fn query_param(&self, name: &str) -> Option<&'a str> {
        self.query()?.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (key == name).then_some(value)
        })
    }

    pub fn headers(&self) -> &'a HeaderMap {
        self.request.headers()
    }

    /// All values for a header as strings. Non-UTF-8 values are skipped.
    pub fn header_values(&self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.request
            .headers()
            .get_all(name)
            .into_iter()
            .filter_map(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &'a Bytes {
        self.request.body()
    }

    /// Full request URL for diagnostics.
    pub fn url(&self) -> String {
        self.request.uri().to_string()
    }

    pub fn inner(&self) -> &'a Request<Bytes> {
        self.request
    }
}

/// Splits `[user@]host[:port]` keeping the port textual. IPv6 literals stay bracketed.
fn split_host_port(authority: &str) -> (&str, Option<&str>) {
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);
    match host_port.rsplit_once(':') {
        Some((host, port)) if !port.contains(']') => {
            (host, Some(port).filter(|p| !p.is_empty()))
        }
        _ => (host_port, None),
    }
}

impl fmt::Debug for RequestDescriptor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescriptor")
            .field("method", &self.method())
            .field("scheme", &self.scheme())
            .field("host", &self.host())
            .field("port", &self.port())
            .field("path", &self.path())
            .finish()
    }
}
