//! Response producers.
//!
//! A matched rule answers with whatever its [`Respond`] implementation returns.
//! [`ResponseTemplate`] covers the constant case; closures taking the request cover
//! responses derived from it.

use crate::request::RequestDescriptor;
use bytes::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::http::{HeaderName, HeaderValue};
use hyper::{HeaderMap, Response, StatusCode};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Produces the synthetic response for a matched request.
pub trait Respond: Send + Sync {
    fn respond(&self, request: &RequestDescriptor<'_>) -> ResponseTemplate;
}

impl Respond for ResponseTemplate {
    fn respond(&self, _request: &RequestDescriptor<'_>) -> ResponseTemplate {
        self.clone()
    }
}

impl<F> Respond for F
where
    F: Fn(&RequestDescriptor<'_>) -> ResponseTemplate + Send + Sync,
{
    fn respond(&self, request: &RequestDescriptor<'_>) -> ResponseTemplate {
        self(request)
    }
}

/// Status, headers and body of a synthetic response.
#[derive(Clone, PartialEq)]
pub struct ResponseTemplate {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ResponseTemplate {
    /// Build a template from a numeric status code. Codes outside `100..=999` become 500.
    pub fn new(status_code: u16) -> Self {
        ResponseTemplate {
            status: StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Append a header. Invalid names or values are skipped.
    pub fn insert_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (HeaderName::from_str(name), HeaderValue::from_str(value)) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn merge_headers<H, K, V>(mut self, headers: H) -> Self
    where
        H: IntoIterator<Item = (K, V)>,
        HeaderName: TryFrom<K>,
        HeaderValue: TryFrom<V>,
    {
        for (key, value) in headers {
            if let (Ok(name), Ok(value)) = (HeaderName::try_from(key), HeaderValue::try_from(value))
            {
                self.headers.append(name, value);
            }
        }
        self
    }

    pub fn set_body_bytes(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a text body, defaulting the content type to `text/plain`.
    pub fn set_body_string(mut self, body: impl Into<String>) -> Self {
        self.body = Bytes::from(body.into());
        self.default_content_type("text/plain")
    }

    /// Serialize `body` as JSON, defaulting the content type to `application/json`.
    /// A value that fails to serialize leaves the body empty.
    pub fn set_body_json<T: Serialize>(mut self, body: &T) -> Self {
        match serde_json::to_vec(body) {
            Ok(bytes) => self.body = Bytes::from(bytes),
            Err(e) => tracing::warn!("Failed to serialize JSON response body: {}", e),
        }
        self.default_content_type("application/json")
    }

    fn default_content_type(mut self, content_type: &'static str) -> Self {
        if !self.headers.contains_key(CONTENT_TYPE) {
            self.headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        self
    }

    /// Materialize the template into a `hyper` response.
    pub fn build(self) -> Response<Bytes> {
        let mut response = Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl fmt::Debug for ResponseTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseTemplate")
            .field("status", &self.status.as_u16())
            .field("headers", &self.headers.len())
            .field("body", &self.body.len())
            .finish()
    }
}

/// Respond with a bare status code: no headers, empty body.
pub fn respond_with_status(status_code: u16) -> ResponseTemplate {
    ResponseTemplate::new(status_code)
}
