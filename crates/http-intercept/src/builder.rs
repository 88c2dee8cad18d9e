//! Fluent accumulation of one rule.
//!
//! ```
//! use http_intercept::{interceptor_builder, InterceptorOptions};
//! use http_intercept::matcher::{for_get, for_path};
//! use http_intercept::response::respond_with_status;
//!
//! let mut options = InterceptorOptions::new();
//! interceptor_builder![for_get(), for_path("/test/"), respond_with_status(200)]
//!     .register_options(&mut options);
//! assert_eq!(options.len(), 1);
//! ```

use crate::error::InterceptError;
use crate::matcher::Matcher;
use crate::registry::{InterceptorOptions, Rule};
use crate::response::{Respond, ResponseTemplate};

/// One argument of the variadic builder: a matcher or the terminal response producer.
pub enum BuilderArg {
    Matcher(Matcher),
    Responder(Box<dyn Respond>),
}

impl From<Matcher> for BuilderArg {
    fn from(matcher: Matcher) -> Self {
        BuilderArg::Matcher(matcher)
    }
}

impl From<ResponseTemplate> for BuilderArg {
    fn from(template: ResponseTemplate) -> Self {
        BuilderArg::Responder(Box::new(template))
    }
}

impl From<Box<dyn Respond>> for BuilderArg {
    fn from(responder: Box<dyn Respond>) -> Self {
        BuilderArg::Responder(responder)
    }
}

/// Accumulates matchers and a response producer, then commits them as one [`Rule`].
///
/// A builder is consumed by the commit.
#[derive(Default)]
pub struct InterceptorBuilder {
    name: Option<String>,
    matchers: Vec<Matcher>,
    responder: Option<Box<dyn Respond>>,
    /// First error met while folding arguments, reported at commit
    pending_error: Option<InterceptError>,
}

impl InterceptorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold an ordered argument list through `with_matcher` / `with_response_producer`.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = BuilderArg>,
    {
        args.into_iter()
            .fold(Self::new(), |builder, arg| match arg {
                BuilderArg::Matcher(matcher) => builder.with_matcher(matcher),
                BuilderArg::Responder(responder) => builder.with_boxed_responder(responder),
            })
    }

    /// Label the rule in logs and diagnostics.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_matcher(mut self, matcher: Matcher) -> Self {
        self.matchers.push(matcher);
        self
    }

    /// Set the response producer. A second call is an error.
    pub fn with_response_producer<R>(self, responder: R) -> Result<Self, InterceptError>
    where
        R: Respond + 'static,
    {
        if self.responder.is_some() {
            return Err(InterceptError::ResponderAlreadySet);
        }
        Ok(self.with_boxed_responder(Box::new(responder)))
    }

    fn with_boxed_responder(mut self, responder: Box<dyn Respond>) -> Self {
        if self.responder.is_some() {
            self.pending_error
                .get_or_insert(InterceptError::ResponderAlreadySet);
        } else {
            self.responder = Some(responder);
        }
        self
    }

    /// Validate and register the rule.
    pub fn try_register(self, options: &mut InterceptorOptions) -> Result<(), InterceptError> {
        if let Some(err) = self.pending_error {
            return Err(err);
        }
        let responder = self.responder.ok_or(InterceptError::Incomplete)?;
        if self.matchers.is_empty() {
            return Err(InterceptError::NoMatchers);
        }
        options.register(Rule::new(self.name, self.matchers, responder));
        Ok(())
    }

    /// Register the rule, panicking if the builder is incomplete.
    ///
    /// An incomplete builder is a mistake in the test itself, so this fails fast
    /// instead of registering a rule that could match everything.
    pub fn register_options(self, options: &mut InterceptorOptions) {
        if let Err(err) = self.try_register(options) {
            panic!("{err}");
        }
    }
}

/// Build an [`InterceptorBuilder`] from matchers and a response producer, in order.
#[macro_export]
macro_rules! interceptor_builder {
    ($($arg:expr),* $(,)?) => {
        $crate::InterceptorBuilder::from_args([$($crate::BuilderArg::from($arg)),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{for_get, for_path};
    use crate::request::RequestDescriptor;
    use crate::response::respond_with_status;

    #[test]
    fn test_commit_registers_one_rule() {
        let mut options = InterceptorOptions::new();
        InterceptorBuilder::new()
            .named("get-test")
            .with_matcher(for_get())
            .with_matcher(for_path("/test/"))
            .with_response_producer(respond_with_status(200))
            .unwrap()
            .register_options(&mut options);

        assert_eq!(options.len(), 1);
        assert_eq!(options.rules()[0].name(), Some("get-test"));
        assert_eq!(options.rules()[0].matchers().len(), 2);
    }

    #[test]
    fn test_missing_responder_is_incomplete() {
        let mut options = InterceptorOptions::new();
        let err = InterceptorBuilder::new()
            .with_matcher(for_get())
            .try_register(&mut options)
            .unwrap_err();

        assert_eq!(err, InterceptError::Incomplete);
        assert!(options.is_empty());
    }

    #[test]
    fn test_missing_matchers_is_rejected() {
        let mut options = InterceptorOptions::new();
        let err = InterceptorBuilder::new()
            .with_response_producer(respond_with_status(200))
            .unwrap()
            .try_register(&mut options)
            .unwrap_err();

        assert_eq!(err, InterceptError::NoMatchers);
        assert!(options.is_empty());
    }

    #[test]
    fn test_second_responder_is_rejected() {
        let err = InterceptorBuilder::new()
            .with_response_producer(respond_with_status(200))
            .unwrap()
            .with_response_producer(respond_with_status(500))
            .err();

        assert!(matches!(err, Some(InterceptError::ResponderAlreadySet)));
    }

    #[test]
    fn test_second_responder_in_args_is_reported_at_commit() {
        let mut options = InterceptorOptions::new();
        let err = crate::interceptor_builder![
            for_get(),
            respond_with_status(200),
            respond_with_status(500)
        ]
        .try_register(&mut options)
        .unwrap_err();

        assert_eq!(err, InterceptError::ResponderAlreadySet);
        assert!(options.is_empty());
    }

    #[test]
    #[should_panic(expected = "Builder incomplete")]
    fn test_register_options_panics_when_incomplete() {
        let mut options = InterceptorOptions::new();
        crate::interceptor_builder![for_get(), for_path("/test/")].register_options(&mut options);
    }

    #[test]
    fn test_from_args_preserves_order() {
        let mut options = InterceptorOptions::new();
        InterceptorBuilder::from_args([
            BuilderArg::from(for_get()),
            BuilderArg::from(for_path("/test/")),
            BuilderArg::from(respond_with_status(204)),
        ])
        .register_options(&mut options);

        let rule = &options.rules()[0];
        let debug: Vec<String> = rule.matchers().iter().map(|m| format!("{m:?}")).collect();
        assert_eq!(debug, vec!["method == GET", "path == /test/"]);
    }

    #[test]
    fn test_closure_responder() {
        let mut options = InterceptorOptions::new();
        let echo: Box<dyn Respond> = Box::new(|r: &RequestDescriptor<'_>| {
            ResponseTemplate::new(200).set_body_string(r.method())
        });
        crate::interceptor_builder![for_path("/echo"), echo].register_options(&mut options);

        assert_eq!(options.len(), 1);
    }
}
