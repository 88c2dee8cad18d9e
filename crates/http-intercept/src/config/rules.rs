//! Declarative rule definitions.

use crate::builder::InterceptorBuilder;
use crate::error::InterceptError;
use crate::matcher::{
    for_host, for_method, for_path, for_path_prefix, for_path_regex, for_port, for_query_param,
    for_scheme, Matcher,
};
use crate::registry::InterceptorOptions;
use crate::response::ResponseTemplate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "match")]
    pub match_config: MatchConfig,
    #[serde(default)]
    pub response: ResponseConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct MatchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<PortValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathMatch>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<HeaderMatch>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<QueryMatch>,
}

/// Ports are compared as text, but YAML authors tend to write them as numbers.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum PortValue {
    Number(u16),
    Text(String),
}

impl PortValue {
    fn into_text(self) -> String {
        match self {
            PortValue::Number(n) => n.to_string(),
            PortValue::Text(s) => s,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum PathMatch {
    Plain(String),
    Exact { exact: String },
    Prefix { prefix: String },
    Regex { regex: String },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HeaderMatch {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryMatch {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseConfig {
    #[serde(default = "default_status_code")]
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// A string is sent verbatim, any other JSON value is serialized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

fn default_status_code() -> u16 {
    200
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            status_code: default_status_code(),
            headers: BTreeMap::new(),
            body: None,
        }
    }
}

impl MatchConfig {
    /// One matcher per present field, in a fixed order.
    pub fn compile(self) -> Result<Vec<Matcher>, InterceptError> {
        let mut matchers = Vec::new();
        if let Some(method) = self.method {
            matchers.push(for_method(method));
        }
        if let Some(scheme) = self.scheme {
            matchers.push(for_scheme(scheme));
        }
        if let Some(host) = self.host {
            matchers.push(for_host(host));
        }
        if let Some(port) = self.port {
            matchers.push(for_port(port.into_text()));
        }
        if let Some(path) = self.path {
            matchers.push(match path {
                PathMatch::Plain(exact) | PathMatch::Exact { exact } => for_path(exact),
                PathMatch::Prefix { prefix } => for_path_prefix(prefix),
                PathMatch::Regex { regex } => for_path_regex(&regex)?,
            });
        }
        for header in self.headers {
            matchers.push(crate::matcher::for_header(header.name, header.value));
        }
        for param in self.query {
            matchers.push(for_query_param(param.name, param.value));
        }
        Ok(matchers)
    }
}

impl ResponseConfig {
    pub fn into_template(self) -> ResponseTemplate {
        let template = ResponseTemplate::new(self.status_code).merge_headers(&self.headers);
        match self.body {
            None => template,
            Some(serde_json::Value::String(text)) => template.set_body_string(text),
            Some(value) => template.set_body_json(&value),
        }
    }
}

impl RuleConfig {
    /// Compile and register this rule.
    pub fn register(self, options: &mut InterceptorOptions) -> Result<(), InterceptError> {
        let matchers = self.match_config.compile()?;
        let mut builder = matchers
            .into_iter()
            .fold(InterceptorBuilder::new(), InterceptorBuilder::with_matcher)
            .with_response_producer(self.response.into_template())?;
        if let Some(name) = self.name {
            builder = builder.named(name);
        }
        builder.try_register(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_match_forms() {
        let plain: PathMatch = serde_yaml::from_str("/test/").unwrap();
        assert_eq!(plain, PathMatch::Plain("/test/".to_string()));

        let prefix: PathMatch = serde_yaml::from_str("prefix: /api").unwrap();
        assert_eq!(
            prefix,
            PathMatch::Prefix {
                prefix: "/api".to_string()
            }
        );
    }

    #[test]
    fn test_port_accepts_number_or_text() {
        let m: MatchConfig = serde_yaml::from_str("port: 8080").unwrap();
        assert_eq!(m.port, Some(PortValue::Number(8080)));

        let m: MatchConfig = serde_yaml::from_str("port: \"http\"").unwrap();
        assert_eq!(m.port, Some(PortValue::Text("http".to_string())));
    }

    #[test]
    fn test_compile_order() {
        let m: MatchConfig = serde_yaml::from_str(
            r#"
path: { exact: /test/ }
method: GET
port: 8080
headers:
  - { name: Accept, value: text/plain }
"#,
        )
        .unwrap();

        let debug: Vec<String> = m
            .compile()
            .unwrap()
            .iter()
            .map(|matcher| format!("{matcher:?}"))
            .collect();
        assert_eq!(
            debug,
            vec![
                "method == GET",
                "port == 8080",
                "path == /test/",
                "header accept == text/plain"
            ]
        );
    }

    #[test]
    fn test_invalid_regex() {
        let m: MatchConfig = serde_yaml::from_str("path: { regex: \"([\" }").unwrap();
        assert!(matches!(
            m.compile(),
            Err(InterceptError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_response_defaults_to_200() {
        let r: ResponseConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(r.into_template().status().as_u16(), 200);
    }

    #[test]
    fn test_empty_match_is_rejected() {
        let rule: RuleConfig = serde_yaml::from_str("match: {}\nresponse: { statusCode: 204 }").unwrap();
        let mut options = InterceptorOptions::new();

        assert_eq!(
            rule.register(&mut options).unwrap_err(),
            InterceptError::NoMatchers
        );
    }
}
