//! Rule files.
//!
//! Rules can be declared in YAML or JSON instead of code and loaded into an
//! [`InterceptorOptions`]:
//!
//! ```yaml
//! failOnUnmatched: true
//! rules:
//!   - name: get-test
//!     match:
//!       method: GET
//!       path: { exact: /test/ }
//!     response:
//!       statusCode: 200
//! ```

mod rules;

use crate::error::InterceptError;
use crate::registry::InterceptorOptions;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use rules::{
    HeaderMatch, MatchConfig, PathMatch, PortValue, QueryMatch, ResponseConfig, RuleConfig,
};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesFile {
    #[serde(default)]
    pub fail_on_unmatched: bool,
    #[serde(default = "default_record_requests")]
    pub record_requests: bool,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

fn default_record_requests() -> bool {
    true
}

impl RulesFile {
    pub fn from_yaml_str(contents: &str) -> Result<Self, anyhow::Error> {
        serde_yaml::from_str(contents).context("Failed to parse YAML rules")
    }

    pub fn from_json_str(contents: &str) -> Result<Self, anyhow::Error> {
        serde_json::from_str(contents).context("Failed to parse JSON rules")
    }

    /// Load from disk. `.json` files are parsed as JSON, anything else as YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file {}", path.display()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        };
        parsed.with_context(|| format!("Invalid rules file {}", path.display()))
    }

    /// Compile every rule, in file order, into a fresh registry.
    pub fn into_options(self) -> Result<InterceptorOptions, InterceptError> {
        let mut options = InterceptorOptions::new();
        options.fail_on_unmatched = self.fail_on_unmatched;
        options.record_requests = self.record_requests;
        for rule in self.rules {
            rule.register(&mut options)?;
        }
        Ok(options)
    }
}

/// Read a rules file and build the registry it describes.
pub fn load_rules<P: AsRef<Path>>(path: P) -> Result<InterceptorOptions, anyhow::Error> {
    let path = path.as_ref();
    let file = RulesFile::from_file(path)?;
    let options = file
        .into_options()
        .with_context(|| format!("Invalid rule in {}", path.display()))?;
    tracing::info!("Loaded {} rule(s) from {}", options.len(), path.display());
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const YAML: &str = r#"
failOnUnmatched: true
rules:
  - name: put-test
    match:
      method: PUT
      path: /test/
    response:
      statusCode: 201
  - match:
      path: { prefix: /test/ }
    response:
      statusCode: 200
      headers:
        Content-Type: application/json
      body: { ok: true }
"#;

    #[test]
    fn test_yaml_rules_into_options() {
        let options = RulesFile::from_yaml_str(YAML)
            .unwrap()
            .into_options()
            .unwrap();

        assert!(options.fail_on_unmatched);
        assert!(options.record_requests);
        assert_eq!(options.len(), 2);
        assert_eq!(options.rules()[0].name(), Some("put-test"));
        assert_eq!(options.rules()[1].name(), None);
    }

    #[test]
    fn test_json_rules() {
        let json = r#"{"rules":[{"match":{"method":"GET","path":"/a"},"response":{"statusCode":204}}]}"#;
        let options = RulesFile::from_json_str(json)
            .unwrap()
            .into_options()
            .unwrap();

        assert!(!options.fail_on_unmatched);
        assert_eq!(options.len(), 1);
    }

    #[test]
    fn test_load_rules_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let options = load_rules(file.path()).unwrap();
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn test_load_rules_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{"recordRequests":false,"rules":[]}"#)
            .unwrap();

        let options = load_rules(file.path()).unwrap();
        assert!(options.is_empty());
        assert!(!options.record_requests);
    }

    #[test]
    fn test_load_rules_missing_file() {
        let err = load_rules("/nonexistent/rules.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read rules file"));
    }

    #[test]
    fn test_load_rules_reports_invalid_rule() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        file.write_all(b"rules:\n  - match: { path: { regex: \"([\" } }\n")
            .unwrap();

        let err = load_rules(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid rule in"));
    }
}
