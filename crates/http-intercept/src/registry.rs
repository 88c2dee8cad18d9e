//! Ordered rule registry and first-match dispatch.

use crate::client::Client;
use crate::interceptor::Interceptor;
use crate::matcher::Matcher;
use crate::request::RequestDescriptor;
use crate::response::{Respond, ResponseTemplate};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// A committed conjunction of matchers bound to one response producer.
pub struct Rule {
    name: Option<String>,
    matchers: Vec<Matcher>,
    responder: Box<dyn Respond>,
}

impl Rule {
    /// Callers guarantee `matchers` is non-empty; the builder and the rule-file loader check it.
    pub(crate) fn new(
        name: Option<String>,
        matchers: Vec<Matcher>,
        responder: Box<dyn Respond>,
    ) -> Self {
        Self {
            name,
            matchers,
            responder,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn matchers(&self) -> &[Matcher] {
        &self.matchers
    }

    /// All matchers must agree.
    pub fn matches(&self, request: &RequestDescriptor<'_>) -> bool {
        self.matchers.iter().all(|m| m.matches(request))
    }

    pub fn respond(&self, request: &RequestDescriptor<'_>) -> ResponseTemplate {
        self.responder.respond(request)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("matchers", &self.matchers)
            .finish_non_exhaustive()
    }
}

/// Outcome of a successful dispatch.
#[derive(Debug)]
pub struct Dispatched {
    /// Registration index of the rule that answered
    pub rule_index: usize,
    pub response: ResponseTemplate,
}

/// Scan `rules` in registration order and answer with the first full match.
pub fn dispatch(rules: &[Arc<Rule>], request: &RequestDescriptor<'_>) -> Option<Dispatched> {
    let (rule_index, rule) = rules
        .iter()
        .enumerate()
        .find(|(_, rule)| rule.matches(request))?;
    debug!(
        rule_index,
        rule_name = rule.name().unwrap_or("-"),
        "Matched {} {}",
        request.method(),
        request.path()
    );
    Some(Dispatched {
        rule_index,
        response: rule.respond(request),
    })
}

/// The registry: rules in registration order plus the no-match policy.
///
/// Created empty per test, filled by builders, then turned into a [`Client`].
#[derive(Debug)]
pub struct InterceptorOptions {
    /// Fail the call with [`InterceptError::UnmatchedRequest`](crate::InterceptError::UnmatchedRequest)
    /// when no rule matches, instead of answering with no response.
    pub fail_on_unmatched: bool,
    /// Keep a journal of every request seen by the interceptor.
    pub record_requests: bool,
    rules: Vec<Arc<Rule>>,
}

impl Default for InterceptorOptions {
    fn default() -> Self {
        Self {
            fail_on_unmatched: false,
            record_requests: true,
            rules: Vec::new(),
        }
    }
}

impl InterceptorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule. Earlier rules shadow later ones; duplicates are allowed.
    pub fn register(&mut self, rule: Rule) {
        info!(
            index = self.rules.len(),
            rule_name = rule.name().unwrap_or("-"),
            "Registered rule with {} matcher(s)",
            rule.matchers().len()
        );
        self.rules.push(Arc::new(rule));
    }

    pub fn rules(&self) -> &[Arc<Rule>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn dispatch(&self, request: &RequestDescriptor<'_>) -> Option<Dispatched> {
        dispatch(&self.rules, request)
    }

    /// Build a client whose transport answers from a snapshot of the current rules.
    /// Rules registered afterwards are not seen by this client.
    pub fn client(&self) -> Client {
        Client::new(Arc::new(Interceptor::armed(self)))
    }

    pub(crate) fn snapshot(&self) -> Arc<[Arc<Rule>]> {
        self.rules.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{for_get, for_path, for_put};
    use crate::response::respond_with_status;
    use bytes::Bytes;
    use hyper::Request;

    fn rule(matchers: Vec<Matcher>, status: u16) -> Rule {
        Rule::new(None, matchers, Box::new(respond_with_status(status)))
    }

    fn request(method: &str, uri: &str) -> Request<Bytes> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Bytes::new())
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let options = InterceptorOptions::new();
        assert!(!options.fail_on_unmatched);
        assert!(options.record_requests);
        assert!(options.is_empty());
    }

    #[test]
    fn test_first_registered_wins() {
        let mut options = InterceptorOptions::new();
        options.register(rule(vec![for_path("/test/")], 200));
        options.register(rule(vec![for_get(), for_path("/test/")], 418));

        let req = request("GET", "/test/");
        let dispatched = options.dispatch(&RequestDescriptor::new(&req)).unwrap();

        assert_eq!(dispatched.rule_index, 0);
        assert_eq!(dispatched.response.status().as_u16(), 200);
    }

    #[test]
    fn test_later_rule_answers_when_earlier_does_not_match() {
        let mut options = InterceptorOptions::new();
        options.register(rule(vec![for_put(), for_path("/test/")], 201));
        options.register(rule(vec![for_get(), for_path("/test/")], 200));

        let req = request("GET", "/test/");
        let dispatched = options.dispatch(&RequestDescriptor::new(&req)).unwrap();

        assert_eq!(dispatched.rule_index, 1);
        assert_eq!(dispatched.response.status().as_u16(), 200);
    }

    #[test]
    fn test_no_match() {
        let mut options = InterceptorOptions::new();
        options.register(rule(vec![for_put(), for_path("/test/")], 200));

        let req = request("GET", "/test/");
        assert!(options.dispatch(&RequestDescriptor::new(&req)).is_none());
    }

    #[test]
    fn test_conjunction_requires_every_matcher() {
        let r = rule(vec![for_get(), for_path("/test/")], 200);

        let both = request("GET", "/test/");
        let wrong_method = request("POST", "/test/");
        let wrong_path = request("GET", "/other/");

        assert!(r.matches(&RequestDescriptor::new(&both)));
        assert!(!r.matches(&RequestDescriptor::new(&wrong_method)));
        assert!(!r.matches(&RequestDescriptor::new(&wrong_path)));
    }

    #[test]
    fn test_client_snapshot_ignores_later_registrations() {
        let mut options = InterceptorOptions::new();
        options.register(rule(vec![for_path("/a")], 200));
        let snapshot = options.snapshot();

        options.register(rule(vec![for_path("/b")], 200));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(options.len(), 2);
    }
}
