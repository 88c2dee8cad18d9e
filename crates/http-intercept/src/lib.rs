//! In-process HTTP request interception for tests.
//!
//! Declare rules up front ("if method is GET and path is `/test/`, answer 200"),
//! build a [`Client`] from them, and every call made through that client is
//! answered by an [`Interceptor`] instead of the network.
//!
//! ```
//! use http_intercept::matcher::{for_get, for_path};
//! use http_intercept::response::respond_with_status;
//! use http_intercept::{interceptor_builder, InterceptorOptions};
//!
//! let mut options = InterceptorOptions::new();
//! interceptor_builder![for_get(), for_path("/test/"), respond_with_status(200)]
//!     .register_options(&mut options);
//!
//! let client = options.client();
//! let response = client.get("/test/").unwrap();
//! assert_eq!(response.status(), 200);
//! ```
//!
//! # Module Structure
//!
//! - `request` - Read-only view of an outgoing request
//! - `matcher` - Request predicates and their constructors
//! - `response` - Response producers
//! - `registry` - Ordered rules and first-match dispatch
//! - `builder` - Fluent construction of one rule
//! - `interceptor` - The fake transport
//! - `client` - Client facade over a transport
//! - `config` - YAML/JSON rule files

pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod interceptor;
pub mod matcher;
pub mod registry;
pub mod request;
pub mod response;

pub use builder::{BuilderArg, InterceptorBuilder};
pub use client::{Client, Transport};
pub use config::{load_rules, RulesFile};
pub use error::{ClientError, InterceptError};
pub use interceptor::{Interceptor, RecordedRequest};
pub use matcher::Matcher;
pub use registry::{InterceptorOptions, Rule};
pub use request::RequestDescriptor;
pub use response::{respond_with_status, Respond, ResponseTemplate};
