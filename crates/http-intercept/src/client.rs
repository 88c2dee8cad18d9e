//! Client facade over a [`Transport`].
//!
//! Test code talks to a [`Client`] the way it would talk to any HTTP client. The
//! client owns no connection state; every call is handed to its transport, which
//! for clients built by [`InterceptorOptions::client`](crate::InterceptorOptions::client)
//! is an armed [`Interceptor`].

use crate::error::{ClientError, InterceptError};
use crate::interceptor::Interceptor;
use bytes::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::{Method, Request, Response, Uri};
use std::sync::Arc;
use tracing::debug;

/// Something that turns a request into a response without leaving the process.
///
/// `Ok(None)` means no response was produced at all.
pub trait Transport: Send + Sync {
    fn send(&self, request: &Request<Bytes>) -> Result<Option<Response<Bytes>>, InterceptError>;
}

/// A cheap-to-clone synchronous HTTP client.
pub struct Client<T: Transport = Interceptor> {
    transport: Arc<T>,
}

impl<T: Transport> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl Client<Interceptor> {
    /// The interceptor behind this client, for inspecting the request journal.
    pub fn interceptor(&self) -> &Interceptor {
        &self.transport
    }
}

impl<T: Transport> Client<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send a prepared request.
    pub fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>, ClientError> {
        debug!("{} {}", request.method(), request.uri());
        match self.transport.send(&request)? {
            Some(response) => Ok(response),
            None => Err(ClientError::NoResponse {
                method: request.method().to_string(),
                url: request.uri().to_string(),
            }),
        }
    }

    pub fn get(&self, url: &str) -> Result<Response<Bytes>, ClientError> {
        self.send_without_body(Method::GET, url)
    }

    pub fn head(&self, url: &str) -> Result<Response<Bytes>, ClientError> {
        self.send_without_body(Method::HEAD, url)
    }

    pub fn delete(&self, url: &str) -> Result<Response<Bytes>, ClientError> {
        self.send_without_body(Method::DELETE, url)
    }

    pub fn post(
        &self,
        url: &str,
        content_type: &str,
        body: impl Into<Bytes>,
    ) -> Result<Response<Bytes>, ClientError> {
        self.send_with_body(Method::POST, url, content_type, body.into())
    }

    pub fn put(
        &self,
        url: &str,
        content_type: &str,
        body: impl Into<Bytes>,
    ) -> Result<Response<Bytes>, ClientError> {
        self.send_with_body(Method::PUT, url, content_type, body.into())
    }

    pub fn patch(
        &self,
        url: &str,
        content_type: &str,
        body: impl Into<Bytes>,
    ) -> Result<Response<Bytes>, ClientError> {
        self.send_with_body(Method::PATCH, url, content_type, body.into())
    }

    fn send_without_body(&self, method: Method, url: &str) -> Result<Response<Bytes>, ClientError> {
        let request = Request::builder()
            .method(method)
            .uri(parse_url(url)?)
            .body(Bytes::new())?;
        self.execute(request)
    }

    fn send_with_body(
        &self,
        method: Method,
        url: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<Response<Bytes>, ClientError> {
        let request = Request::builder()
            .method(method)
            .uri(parse_url(url)?)
            .header(CONTENT_TYPE, content_type)
            .body(body)?;
        self.execute(request)
    }
}

fn parse_url(url: &str) -> Result<Uri, ClientError> {
    url.parse::<Uri>()
        .map_err(|_| ClientError::InvalidUrl(url.to_string()))
}
