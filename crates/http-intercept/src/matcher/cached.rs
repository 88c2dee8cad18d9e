//! Case-insensitive comparison helper shared by the string-valued matchers.

/// A string value with pre-computed lowercase for case-insensitive matching.
///
/// The lowercase form is computed once when the matcher is built, so dispatch
/// only lowercases the request side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedValue {
    /// Original value (for case-sensitive matching and display)
    pub value: String,
    /// Pre-computed lowercase (for case-insensitive matching)
    pub lower: String,
}

impl CachedValue {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let lower = value.to_lowercase();
        Self { value, lower }
    }

    /// Check equality against a string value.
    #[inline]
    pub fn equals(&self, value: &str, case_sensitive: bool) -> bool {
        if case_sensitive {
            value == self.value
        } else if value.is_ascii() && self.lower.is_ascii() {
            value.eq_ignore_ascii_case(&self.lower)
        } else {
            value.to_lowercase() == self.lower
        }
    }
}

impl From<String> for CachedValue {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for CachedValue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
